//! Board-agnostic control plane for the action camera
//!
//! Everything between the link bytes and the board peripherals that does
//! not depend on a specific MCU:
//!
//! - Message dispatch to registered consumers
//! - Device lifecycle state machine and power manager
//! - Error codes and the LED alert for them
//! - Host watchdog supervision
//! - Host-side consumers (battery, buttons, watchdog client)
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod power;
pub mod safety;
pub mod state;
pub mod traits;

pub use config::{ConfigError, DeviceConfig};
pub use dispatch::{Consumer, Dispatcher};
pub use power::PowerManager;
