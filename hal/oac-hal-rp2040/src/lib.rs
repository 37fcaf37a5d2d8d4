//! RP2040-specific HAL for the OAC device firmware
//!
//! Implements the `oac-hal` traits on embassy-rp types and fixes the board
//! pin map:
//!
//! - GPIO wrappers for the power rail, line sensing and button
//! - Link UART adapters over the buffered UART halves
//! - Pin assignments

#![no_std]

pub mod gpio;
pub mod pins;
pub mod uart;

pub use gpio::{RpInput, RpOutput};
pub use uart::{link_config, LinkRx, LinkTx};
