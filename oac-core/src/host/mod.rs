//! Host-side consumers
//!
//! Observers the camera host registers with its dispatcher: battery status
//! cache, button input and the watchdog client. Each reacts only to the
//! message types it cares about and ignores the rest.

pub mod battery;
pub mod button;
pub mod watchdog;

pub use battery::BatteryMonitor;
pub use button::{ButtonInput, Key};
pub use watchdog::{WatchdogClient, WatchdogError};
