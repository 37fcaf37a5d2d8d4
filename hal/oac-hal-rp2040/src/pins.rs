//! Board pin map
//!
//! GPIO numbers on the camera's power board. `main` takes the matching
//! `PIN_n` peripherals; the constants document the wiring and are checked
//! against the RP2040 UART function table at compile time.

/// UART0 TX to the host RX
pub const LINK_TX: u8 = 0;
/// UART0 RX from the host TX
pub const LINK_RX: u8 = 1;
/// Second input tied to the host TX line, sampled while the UART is idle
pub const LINE_SENSE: u8 = 2;
/// Gate of the host power switch, high = on
pub const RAIL_ENABLE: u8 = 3;
/// Front button to GND, internal pull-up
pub const BUTTON: u8 = 4;
/// Battery divider tap (ADC0)
pub const BATTERY_SENSE: u8 = 26;

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart0,
    Uart1,
}

/// Which UART can use a given GPIO, if any
pub const fn gpio_to_uart(gpio: u8) -> Option<UartId> {
    // UART0: GPIO 0/1, 12/13, 16/17
    // UART1: GPIO 4/5, 8/9, 20/21, 24/25
    match gpio {
        0 | 1 | 12 | 13 | 16 | 17 => Some(UartId::Uart0),
        4 | 5 | 8 | 9 | 20 | 21 | 24 | 25 => Some(UartId::Uart1),
        _ => None,
    }
}

const _: () = assert!(matches!(gpio_to_uart(LINK_TX), Some(UartId::Uart0)));
const _: () = assert!(matches!(gpio_to_uart(LINK_RX), Some(UartId::Uart0)));
const _: () = assert!(BATTERY_SENSE >= 26 && BATTERY_SENSE <= 29);
