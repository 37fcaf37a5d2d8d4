//! Safety monitoring
//!
//! Detects a hung host and triggers error states.

pub mod watchdog;

pub use watchdog::{HostWatchdog, WatchdogStatus};
