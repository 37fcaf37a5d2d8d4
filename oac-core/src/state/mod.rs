//! Device lifecycle state machine
//!
//! Defines the authoritative power and recording lifecycle of the device.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::{Event, Press};
pub use machine::DeviceState;
