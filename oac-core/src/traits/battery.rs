//! Battery gauge trait

/// Source of battery readings for STATUS reports and threshold checks
pub trait BatteryGauge {
    /// Latest battery voltage in microvolts, `None` before the first sample
    fn battery_uv(&self) -> Option<u32>;

    /// Whether the charger is currently active
    fn is_charging(&self) -> bool;
}
