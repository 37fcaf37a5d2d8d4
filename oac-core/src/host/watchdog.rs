//! Watchdog client: the host end of the device's host watchdog

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use oac_protocol::{Command, Message, Payload, Recipient};

use crate::config::{WATCHDOG_MAX_S, WATCHDOG_MIN_S};
use crate::dispatch::Consumer;

/// Watchdog client errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogError {
    /// Requested timeout outside the accepted range
    TimeoutOutOfRange,
}

/// Builds watchdog requests and tracks the timeout the device applied
pub struct WatchdogClient<M: RawMutex> {
    confirmed_s: Mutex<M, Cell<Option<u32>>>,
}

impl<M: RawMutex> WatchdogClient<M> {
    pub const fn new() -> Self {
        Self {
            confirmed_s: Mutex::new(Cell::new(None)),
        }
    }

    pub fn start(&self) -> Message {
        Message::command(Recipient::Firmware, Command::WdStart)
    }

    pub fn stop(&self) -> Message {
        Message::command(Recipient::Firmware, Command::WdStop)
    }

    pub fn kick(&self) -> Message {
        Message::command(Recipient::Firmware, Command::WdKick)
    }

    /// Request a new timeout in seconds
    pub fn set_timeout(&self, seconds: u32) -> Result<Message, WatchdogError> {
        if !(WATCHDOG_MIN_S..=WATCHDOG_MAX_S).contains(&seconds) {
            return Err(WatchdogError::TimeoutOutOfRange);
        }
        Ok(Message::response(
            Recipient::Firmware,
            Command::WdSetTimeout.to_u16(),
            seconds as u64,
        ))
    }

    /// Timeout last confirmed by the device
    pub fn confirmed_timeout_s(&self) -> Option<u32> {
        self.confirmed_s.lock(Cell::get)
    }
}

impl<M: RawMutex> Default for WatchdogClient<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex + Sync> Consumer for WatchdogClient<M> {
    fn on_message(&self, message: &Message) {
        if let Payload::Response(response) = &message.payload {
            if response.param == Command::WdSetTimeout.to_u16() {
                let seconds = u32::try_from(response.value).unwrap_or(u32::MAX);
                self.confirmed_s.lock(|c| c.set(Some(seconds)));
            }
        }
    }
}
