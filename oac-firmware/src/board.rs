//! Collaborators the power manager drives on this board

use portable_atomic::Ordering;

use oac_core::traits::{Animation, BatteryGauge, Color, Indicator};

use crate::channels::{BATTERY_UV, CHARGING, LED_STATE};
use crate::tasks::led::LedState;

/// Forwards indicator requests to the LED task
pub struct LedIndicator {
    state: LedState,
}

impl LedIndicator {
    pub fn new() -> Self {
        Self {
            state: LedState::OFF,
        }
    }

    fn publish(&self) {
        LED_STATE.signal(self.state);
    }
}

impl Indicator for LedIndicator {
    fn set_color(&mut self, color: Color) {
        self.state.color = Some(color);
        self.publish();
    }

    fn set_animation(&mut self, animation: Option<Animation>) {
        self.state.animation = animation;
        self.publish();
    }

    fn off(&mut self) {
        self.state = LedState::OFF;
        self.publish();
    }
}

/// Reads the values published by the battery task
pub struct BatteryReading;

impl BatteryGauge for BatteryReading {
    fn battery_uv(&self) -> Option<u32> {
        match BATTERY_UV.load(Ordering::Relaxed) {
            0 => None,
            uv => Some(uv),
        }
    }

    fn is_charging(&self) -> bool {
        CHARGING.load(Ordering::Relaxed)
    }
}
