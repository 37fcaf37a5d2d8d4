//! Collaborator traits
//!
//! These traits define the interface between the lifecycle logic and the
//! peripherals it drives but does not own the details of.

pub mod battery;
pub mod indicator;

pub use battery::BatteryGauge;
pub use indicator::{Animation, Color, Indicator};
