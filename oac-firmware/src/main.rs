//! OAC - Open Action Camera power firmware
//!
//! Firmware for the RP2040 power board that sits between the battery and
//! the Linux host of an action camera. It owns the host's power rail,
//! the record button and the status LED, and talks to the host over a
//! framed UART link.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartTx, Uart};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use oac_core::{DeviceConfig, Dispatcher, PowerManager};
use oac_hal::UartConfig;
use oac_hal_rp2040::{link_config, pins, LinkRx, LinkTx, RpInput, RpOutput};

use crate::board::{BatteryReading, LedIndicator};
use crate::channels::INBOX;

mod board;
mod channels;
mod tasks;

/// Dispatcher for the host link
///
/// Every task that touches it runs on the same executor, so no critical
/// section is needed around the registry or the TX half.
pub type LinkDispatcher = Dispatcher<'static, NoopRawMutex, LinkTx<BufferedUartTx>>;

/// Power manager wired to this board
pub type DevicePowerManager = PowerManager<RpOutput, RpInput, LedIndicator, BatteryReading>;

/// Device configuration validated from device.toml at build time
static DEVICE_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/device_config.bin"));

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static DISPATCHER: StaticCell<LinkDispatcher> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("OAC firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Host link on UART0 (GPIO0 TX, GPIO1 RX)
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, link_config(&UartConfig::default()));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    let dispatcher: &'static LinkDispatcher = DISPATCHER.init(Dispatcher::new(LinkTx::new(tx)));
    if dispatcher.register(&INBOX).is_err() {
        error!("Could not register controller inbox");
    }

    info!(
        "UART initialized for host link (TX GPIO{}, RX GPIO{})",
        pins::LINK_TX,
        pins::LINK_RX
    );

    // Host TX sense, rail enable and button
    let line = RpInput::new(Input::new(p.PIN_2, Pull::Down));
    let rail = RpOutput::new(Output::new(p.PIN_3, Level::Low));
    let button = Input::new(p.PIN_4, Pull::Up);
    // Charger STAT, low while charging
    let charge_status = Input::new(p.PIN_5, Pull::Up);

    // Status LED, red/green/blue active high
    let led_pins = [
        Output::new(p.PIN_6, Level::Low),
        Output::new(p.PIN_7, Level::Low),
        Output::new(p.PIN_8, Level::Low),
    ];

    // Battery sense through a divider on GPIO26
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let battery_channel = Channel::new_pin(p.PIN_26, Pull::None);

    info!(
        "GPIO initialized (sense GPIO{}, rail GPIO{}, button GPIO{}), battery on GPIO{}",
        pins::LINE_SENSE,
        pins::RAIL_ENABLE,
        pins::BUTTON,
        pins::BATTERY_SENSE
    );

    let manager = PowerManager::new(rail, line, LedIndicator::new(), BatteryReading, config);

    // Spawn tasks
    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::led_task(led_pins)).unwrap();
    spawner.spawn(tasks::button_task(button)).unwrap();
    spawner
        .spawn(tasks::battery_task(adc, battery_channel, charge_status))
        .unwrap();
    spawner
        .spawn(tasks::link_rx_task(LinkRx::new(rx), dispatcher))
        .unwrap();
    spawner
        .spawn(tasks::controller_task(manager, dispatcher))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Decode the embedded configuration
///
/// build.rs has already validated it, so failure here means the image is
/// corrupt. Fall back to defaults rather than leaving the host unpowered.
fn load_config() -> DeviceConfig {
    match DeviceConfig::from_bytes(DEVICE_CONFIG) {
        Ok(config) => {
            info!("Configuration loaded");
            config
        }
        Err(e) => {
            error!("Embedded configuration invalid ({:?}), using defaults", e);
            DeviceConfig::default()
        }
    }
}
