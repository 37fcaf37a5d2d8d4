//! Battery monitoring task
//!
//! Samples the pack voltage through a resistor divider on the ADC and the
//! charger status pin, and publishes both for the power manager.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use crate::channels::{BATTERY_UV, CHARGING};

/// Sample period
const SAMPLE_INTERVAL_MS: u64 = 500;

/// ADC reference in microvolts
const ADC_REF_UV: u64 = 3_300_000;

/// 12-bit ADC full scale
const ADC_MAX: u64 = 4096;

/// Divider 100k over 33k
const DIVIDER_NUM: u64 = 133;
const DIVIDER_DEN: u64 = 33;

/// Battery task
#[embassy_executor::task]
pub async fn battery_task(
    mut adc: Adc<'static, Async>,
    mut channel: Channel<'static>,
    charge_status: Input<'static>,
) {
    info!("Battery task started");

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        match adc.read(&mut channel).await {
            Ok(raw) => {
                let uv = raw_to_uv(raw);
                trace!("Battery: {} uV", uv);
                BATTERY_UV.store(uv, Ordering::Relaxed);
            }
            Err(e) => {
                warn!("Battery ADC read failed: {:?}", e);
            }
        }
        CHARGING.store(charge_status.is_low(), Ordering::Relaxed);

        ticker.next().await;
    }
}

/// Pack voltage for a raw ADC reading
fn raw_to_uv(raw: u16) -> u32 {
    (raw as u64 * ADC_REF_UV * DIVIDER_NUM / (ADC_MAX * DIVIDER_DEN)) as u32
}
