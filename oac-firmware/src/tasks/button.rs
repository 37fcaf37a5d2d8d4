//! Button task
//!
//! Debounces the front button and classifies each press by how long it
//! was held. The press is reported on release.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{with_timeout, Duration, Timer};

use oac_core::state::Press;

use crate::channels::BUTTON_CHANNEL;

/// Hold time that turns a press into a long press
pub const LONG_PRESS_MS: u64 = 1_000;

/// Contact bounce settle time
const DEBOUNCE_MS: u64 = 20;

/// Button task - the button pulls the pin to GND
#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>) {
    info!("Button task started");

    loop {
        button.wait_for_low().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if button.is_high() {
            continue;
        }

        let held = Duration::from_millis(LONG_PRESS_MS - DEBOUNCE_MS);
        let press = match with_timeout(held, button.wait_for_high()).await {
            Ok(()) => Press::Short,
            Err(_) => {
                button.wait_for_high().await;
                Press::Long
            }
        };
        Timer::after_millis(DEBOUNCE_MS).await;

        if BUTTON_CHANNEL.try_send(press).is_err() {
            warn!("Button channel full, dropping press");
        }
    }
}
