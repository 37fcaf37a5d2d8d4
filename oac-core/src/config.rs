//! Device configuration
//!
//! Timing and threshold parameters of the lifecycle. The firmware bakes a
//! validated copy in at build time from `device.toml`; with the `serde`
//! feature it travels as postcard binary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shortest accepted watchdog timeout, seconds
pub const WATCHDOG_MIN_S: u32 = 1;

/// Longest accepted watchdog timeout, seconds
pub const WATCHDOG_MAX_S: u32 = 60;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A timeout or interval is zero
    ZeroDuration,
    /// Confirmation window does not fit inside the shutdown timeout
    ConfirmWindowTooLong,
    /// Watchdog bounds are inverted or the default lies outside them
    WatchdogRange,
    /// Low battery threshold is not below the over-voltage threshold
    BatteryThresholds,
    /// Binary config could not be decoded
    Deserialize,
}

/// Lifecycle timing and thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Time allowed for the host to boot and send its first heartbeat
    pub startup_timeout_ms: u32,
    /// Time allowed for the host to acknowledge a shutdown request
    pub shutdown_request_timeout_ms: u32,
    /// Time allowed for the host TX line to settle LOW after acknowledging
    pub shutdown_timeout_ms: u32,
    /// How long the line must stay LOW before power is cut
    pub shutdown_confirm_ms: u32,
    /// STATUS report period while the host is powered
    pub status_interval_ms: u32,
    /// Watchdog timeout used until the host sets one
    pub watchdog_default_s: u32,
    pub watchdog_min_s: u32,
    pub watchdog_max_s: u32,
    /// Battery voltage below which a low-battery error is raised
    pub low_battery_uv: u32,
    /// Battery voltage above which an over-voltage error is raised
    pub over_voltage_uv: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            startup_timeout_ms: 30_000,
            shutdown_request_timeout_ms: 30_000,
            shutdown_timeout_ms: 30_000,
            shutdown_confirm_ms: 5_000,
            status_interval_ms: 1_000,
            watchdog_default_s: 10,
            watchdog_min_s: WATCHDOG_MIN_S,
            watchdog_max_s: WATCHDOG_MAX_S,
            low_battery_uv: 6_000_000,
            over_voltage_uv: 8_600_000,
        }
    }
}

impl DeviceConfig {
    /// Check that the values are consistent with each other
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            self.startup_timeout_ms,
            self.shutdown_request_timeout_ms,
            self.shutdown_timeout_ms,
            self.shutdown_confirm_ms,
            self.status_interval_ms,
        ];
        if durations.contains(&0) {
            return Err(ConfigError::ZeroDuration);
        }

        if self.shutdown_confirm_ms >= self.shutdown_timeout_ms {
            return Err(ConfigError::ConfirmWindowTooLong);
        }

        if self.watchdog_min_s == 0
            || self.watchdog_min_s > self.watchdog_max_s
            || !(self.watchdog_min_s..=self.watchdog_max_s).contains(&self.watchdog_default_s)
        {
            return Err(ConfigError::WatchdogRange);
        }

        if self.low_battery_uv >= self.over_voltage_uv {
            return Err(ConfigError::BatteryThresholds);
        }

        Ok(())
    }

    /// Decode and validate a postcard-encoded configuration
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(DeviceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = DeviceConfig {
            status_interval_ms: 0,
            ..DeviceConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn test_confirm_window_must_fit() {
        let config = DeviceConfig {
            shutdown_confirm_ms: 30_000,
            ..DeviceConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ConfirmWindowTooLong));
    }

    #[test]
    fn test_watchdog_default_outside_range() {
        let config = DeviceConfig {
            watchdog_default_s: 90,
            ..DeviceConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::WatchdogRange));

        let config = DeviceConfig {
            watchdog_min_s: 20,
            watchdog_max_s: 5,
            ..DeviceConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::WatchdogRange));
    }

    #[test]
    fn test_battery_thresholds() {
        let config = DeviceConfig {
            low_battery_uv: 9_000_000,
            ..DeviceConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BatteryThresholds));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let config = DeviceConfig {
            shutdown_confirm_ms: 2_500,
            ..DeviceConfig::default()
        };
        let mut buf = [0u8; 64];
        let bytes = postcard::to_slice(&config, &mut buf).unwrap();
        assert_eq!(DeviceConfig::from_bytes(bytes), Ok(config));
    }
}
