//! Device lifecycle state machine
//!
//! Power rail, LED and link behavior are a function of the current state.
//! Transitions are a pure function of (state, event); the side effects of
//! entering a state live in [`crate::power::PowerManager`].

use super::events::{Event, Press};
use crate::error::ErrorCode;

/// Device lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Host unpowered, waiting for a button press
    LowPower,
    /// Host powered, waiting for its first heartbeat
    Startup,
    /// Host up and idle
    Ready,
    /// Host recording video
    Recording,
    /// Shutdown requested, waiting for the host to acknowledge
    ShutdownRequest,
    /// Host shutting down; link suspended while the TX line is sensed
    Shutdown,
    /// Fault latched; cleared by a button press
    Error(ErrorCode),
}

impl DeviceState {
    /// State code reported in STATUS messages
    pub fn code(&self) -> u8 {
        match self {
            DeviceState::LowPower => 0,
            DeviceState::Startup => 1,
            DeviceState::Ready => 2,
            DeviceState::Recording => 3,
            DeviceState::ShutdownRequest => 4,
            DeviceState::Shutdown => 5,
            DeviceState::Error(_) => 6,
        }
    }

    /// Check if the host is up and talking on the link
    pub fn host_online(&self) -> bool {
        matches!(
            self,
            DeviceState::Ready | DeviceState::Recording | DeviceState::ShutdownRequest
        )
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, DeviceState::Error(_))
    }

    /// Process an event and return the next state
    ///
    /// Events with no matching transition leave the state unchanged.
    pub fn transition(self, event: Event) -> Self {
        use DeviceState::*;
        use Event::*;

        match (self, event) {
            // Code 0 is "no error", never a fault
            (_, ErrorDetected(code)) | (_, HostError(code)) if code.code() == 0 => self,

            // LowPower transitions
            (LowPower, Button(_)) => Startup,
            (LowPower, ErrorDetected(code)) => Error(code),

            // Startup transitions
            (Startup, HostAlive) => Ready,
            (Startup, StartupTimeout) => Error(ErrorCode::NoCommRpi),

            // Ready transitions
            (Ready, Button(Press::Short)) => Recording,
            (Ready, Button(Press::Long)) => ShutdownRequest,
            (Ready, ShutdownStarted) => Shutdown,
            (Ready, WatchdogExpired) => Error(ErrorCode::NoCommRpi),

            // Recording transitions
            (Recording, Button(Press::Short)) => Ready,
            (Recording, Button(Press::Long)) => ShutdownRequest,
            (Recording, ShutdownStarted) => Shutdown,
            (Recording, WatchdogExpired) => Error(ErrorCode::NoCommRpi),

            // ShutdownRequest transitions
            (ShutdownRequest, ShutdownStarted) => Shutdown,
            (ShutdownRequest, ShutdownRequestTimeout) => Error(ErrorCode::RpiShutdownReqTimeout),

            // Shutdown transitions
            (Shutdown, LineIdleConfirmed) => LowPower,
            (Shutdown, ShutdownTimeout) => Error(ErrorCode::RpiShutdownTimeout),

            // Error transitions
            (Error(_), Button(_)) => LowPower,
            (Error(_), ErrorCleared) => LowPower,

            // Faults from any state; the host cannot report while unpowered
            (LowPower, HostError(_)) => LowPower,
            (_, ErrorDetected(code)) => Error(code),
            (_, HostError(code)) => Error(code),

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_sequence() {
        let state = DeviceState::LowPower.transition(Event::Button(Press::Short));
        assert_eq!(state, DeviceState::Startup);
        let state = state.transition(Event::HostAlive);
        assert_eq!(state, DeviceState::Ready);
    }

    #[test]
    fn test_any_press_powers_on() {
        assert_eq!(
            DeviceState::LowPower.transition(Event::Button(Press::Long)),
            DeviceState::Startup
        );
    }

    #[test]
    fn test_record_toggle() {
        let state = DeviceState::Ready.transition(Event::Button(Press::Short));
        assert_eq!(state, DeviceState::Recording);
        assert_eq!(
            state.transition(Event::Button(Press::Short)),
            DeviceState::Ready
        );
    }

    #[test]
    fn test_long_press_requests_shutdown() {
        for state in [DeviceState::Ready, DeviceState::Recording] {
            assert_eq!(
                state.transition(Event::Button(Press::Long)),
                DeviceState::ShutdownRequest
            );
        }
    }

    #[test]
    fn test_shutdown_started_from_online_states() {
        for state in [
            DeviceState::Ready,
            DeviceState::Recording,
            DeviceState::ShutdownRequest,
        ] {
            assert_eq!(
                state.transition(Event::ShutdownStarted),
                DeviceState::Shutdown
            );
        }
        // Not before the host is up
        assert_eq!(
            DeviceState::Startup.transition(Event::ShutdownStarted),
            DeviceState::Startup
        );
    }

    #[test]
    fn test_timeouts_map_to_errors() {
        assert_eq!(
            DeviceState::Startup.transition(Event::StartupTimeout),
            DeviceState::Error(ErrorCode::NoCommRpi)
        );
        assert_eq!(
            DeviceState::ShutdownRequest.transition(Event::ShutdownRequestTimeout),
            DeviceState::Error(ErrorCode::RpiShutdownReqTimeout)
        );
        assert_eq!(
            DeviceState::Shutdown.transition(Event::ShutdownTimeout),
            DeviceState::Error(ErrorCode::RpiShutdownTimeout)
        );
        assert_eq!(
            DeviceState::Recording.transition(Event::WatchdogExpired),
            DeviceState::Error(ErrorCode::NoCommRpi)
        );
    }

    #[test]
    fn test_stale_timers_ignored() {
        assert_eq!(
            DeviceState::Ready.transition(Event::StartupTimeout),
            DeviceState::Ready
        );
        assert_eq!(
            DeviceState::LowPower.transition(Event::ShutdownTimeout),
            DeviceState::LowPower
        );
        assert_eq!(
            DeviceState::ShutdownRequest.transition(Event::WatchdogExpired),
            DeviceState::ShutdownRequest
        );
    }

    #[test]
    fn test_press_ignored_while_host_transitions() {
        for state in [
            DeviceState::Startup,
            DeviceState::ShutdownRequest,
            DeviceState::Shutdown,
        ] {
            assert_eq!(state.transition(Event::Button(Press::Short)), state);
            assert_eq!(state.transition(Event::Button(Press::Long)), state);
        }
    }

    #[test]
    fn test_error_cleared_by_press() {
        let state = DeviceState::Error(ErrorCode::NoCommRpi);
        assert_eq!(
            state.transition(Event::Button(Press::Short)),
            DeviceState::LowPower
        );
        assert_eq!(state.transition(Event::ErrorCleared), DeviceState::LowPower);
        assert_eq!(state.transition(Event::HostAlive), state);
    }

    #[test]
    fn test_host_error_needs_powered_host() {
        let code = ErrorCode::CameraNotFound;
        assert_eq!(
            DeviceState::LowPower.transition(Event::HostError(code)),
            DeviceState::LowPower
        );
        for state in [
            DeviceState::Startup,
            DeviceState::Ready,
            DeviceState::Recording,
            DeviceState::Shutdown,
        ] {
            assert_eq!(state.transition(Event::HostError(code)), DeviceState::Error(code));
        }
    }

    #[test]
    fn test_code_zero_is_not_a_fault() {
        let none = ErrorCode::from_u8(0);
        for state in [
            DeviceState::LowPower,
            DeviceState::Ready,
            DeviceState::Recording,
            DeviceState::Shutdown,
        ] {
            assert_eq!(state.transition(Event::HostError(none)), state);
            assert_eq!(state.transition(Event::ErrorDetected(none)), state);
        }
    }

    #[test]
    fn test_local_error_from_any_state() {
        let code = ErrorCode::LowBattery;
        for state in [
            DeviceState::LowPower,
            DeviceState::Ready,
            DeviceState::Shutdown,
            DeviceState::Error(ErrorCode::NoCommRpi),
        ] {
            assert_eq!(state.transition(Event::ErrorDetected(code)), DeviceState::Error(code));
        }
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(DeviceState::LowPower.code(), 0);
        assert_eq!(DeviceState::Shutdown.code(), 5);
        assert_eq!(DeviceState::Error(ErrorCode::LowBattery).code(), 6);
        assert!(DeviceState::ShutdownRequest.host_online());
        assert!(!DeviceState::Shutdown.host_online());
    }
}
