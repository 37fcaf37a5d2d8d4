//! Host power control

pub mod manager;
pub mod shutdown;

pub use manager::{PowerManager, OUTBOX_DEPTH};
pub use shutdown::{LineIdleMonitor, ShutdownProgress};
