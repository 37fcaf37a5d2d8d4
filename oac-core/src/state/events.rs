//! State machine events

use crate::error::ErrorCode;

/// Classified button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    Short,
    Long,
}

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Button released after a press
    Button(Press),
    /// Host sent a heartbeat or watchdog kick
    HostAlive,
    /// Host reported it is shutting down
    ShutdownStarted,
    /// Host TX line stayed LOW for the whole confirmation window
    LineIdleConfirmed,

    // Timers
    /// No heartbeat within the startup timeout
    StartupTimeout,
    /// No acknowledgement within the shutdown request timeout
    ShutdownRequestTimeout,
    /// Line never confirmed idle within the shutdown timeout
    ShutdownTimeout,
    /// Host watchdog armed and not kicked in time
    WatchdogExpired,

    // Errors
    /// Fault detected on this processor
    ErrorDetected(ErrorCode),
    /// Fault reported by the host over the link
    HostError(ErrorCode),
    /// Active error cleared by the error subsystem
    ErrorCleared,
}
