//! Error and alert subsystem
//!
//! Maps error codes to a message, an optional ERROR frame for the peer and
//! a blink pattern on the status LED.

pub mod codes;
pub mod handler;

pub use codes::{ErrorCode, Origin};
pub use handler::ErrorHandler;
