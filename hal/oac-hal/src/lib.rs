//! OAC Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the device control plane is
//! written against. Chip-specific crates implement them so the lifecycle
//! logic in `oac-core` can run unchanged on the MCU and in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  oac-core / oac-firmware                │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  oac-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ oac-hal-rp2040│
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - power rail gate, line sensing, button
//! - [`uart::UartTx`], [`uart::UartRx`] - the half-duplex link to the host

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::{InputPin, OutputPin};
pub use uart::{UartConfig, UartRx, UartTx};
