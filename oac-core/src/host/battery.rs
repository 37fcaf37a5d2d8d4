//! Battery status cache fed by device STATUS reports

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use oac_protocol::{Message, Payload, StatusBody};

use crate::dispatch::Consumer;

/// Pack voltage at 0 % (2S Li-ion)
pub const EMPTY_UV: u32 = 6_000_000;

/// Pack voltage at 100 %
pub const FULL_UV: u32 = 8_400_000;

/// Design capacity, µWh
pub const ENERGY_FULL_DESIGN_UWH: u64 = 48_840_000;

/// Latest STATUS from the device and values derived from it
pub struct BatteryMonitor<M: RawMutex> {
    latest: Mutex<M, Cell<Option<StatusBody>>>,
}

impl<M: RawMutex> BatteryMonitor<M> {
    pub const fn new() -> Self {
        Self {
            latest: Mutex::new(Cell::new(None)),
        }
    }

    /// Most recent STATUS body, if one has arrived
    pub fn latest(&self) -> Option<StatusBody> {
        self.latest.lock(Cell::get)
    }

    pub fn voltage_uv(&self) -> Option<u32> {
        self.latest().map(|s| s.battery_uv)
    }

    /// Remaining capacity, linear between [`EMPTY_UV`] and [`FULL_UV`]
    pub fn capacity_percent(&self) -> Option<u8> {
        self.voltage_uv().map(capacity_from_uv)
    }

    /// Remaining energy estimated from capacity, µWh
    pub fn energy_now_uwh(&self) -> Option<u64> {
        self.capacity_percent()
            .map(|pct| ENERGY_FULL_DESIGN_UWH * pct as u64 / 100)
    }

    pub fn is_charging(&self) -> bool {
        self.latest().is_some_and(|s| s.charging)
    }
}

impl<M: RawMutex> Default for BatteryMonitor<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex + Sync> Consumer for BatteryMonitor<M> {
    fn on_message(&self, message: &Message) {
        if let Payload::Status(status) = &message.payload {
            self.latest.lock(|latest| latest.set(Some(*status)));
        }
    }
}

fn capacity_from_uv(uv: u32) -> u8 {
    if uv <= EMPTY_UV {
        return 0;
    }
    if uv >= FULL_UV {
        return 100;
    }
    ((uv - EMPTY_UV) as u64 * 100 / (FULL_UV - EMPTY_UV) as u64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use oac_protocol::{Command, Recipient};

    fn status(battery_uv: u32, charging: bool) -> Message {
        Message::status(
            Recipient::Linux,
            StatusBody {
                battery_uv,
                state: 2,
                charging,
                error_code: 0,
            },
        )
    }

    #[test]
    fn test_empty_until_first_status() {
        let monitor = BatteryMonitor::<CriticalSectionRawMutex>::new();
        assert_eq!(monitor.capacity_percent(), None);
        assert!(!monitor.is_charging());
    }

    #[test]
    fn test_caches_latest_status() {
        let monitor = BatteryMonitor::<CriticalSectionRawMutex>::new();
        monitor.on_message(&status(7_200_000, false));
        monitor.on_message(&status(8_000_000, true));
        assert_eq!(monitor.voltage_uv(), Some(8_000_000));
        assert!(monitor.is_charging());
    }

    #[test]
    fn test_ignores_other_messages() {
        let monitor = BatteryMonitor::<CriticalSectionRawMutex>::new();
        monitor.on_message(&Message::command(Recipient::Linux, Command::BtnShort));
        assert_eq!(monitor.latest(), None);
    }

    #[test]
    fn test_capacity_and_energy() {
        let monitor = BatteryMonitor::<CriticalSectionRawMutex>::new();
        monitor.on_message(&status(7_200_000, false));
        assert_eq!(monitor.capacity_percent(), Some(50));
        assert_eq!(monitor.energy_now_uwh(), Some(24_420_000));
    }

    #[test]
    fn test_capacity_clamped() {
        assert_eq!(capacity_from_uv(0), 0);
        assert_eq!(capacity_from_uv(EMPTY_UV), 0);
        assert_eq!(capacity_from_uv(FULL_UV), 100);
        assert_eq!(capacity_from_uv(9_000_000), 100);
    }
}
