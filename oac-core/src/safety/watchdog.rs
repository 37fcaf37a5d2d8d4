//! Host watchdog supervision
//!
//! The host's kernel watchdog driver arms, kicks and configures this timer
//! over the link. If the host stops kicking while armed, the device treats
//! it as hung.

use oac_protocol::{Command, Message, Payload, Recipient};

use crate::config::DeviceConfig;

/// Watchdog check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogStatus {
    /// Disarmed, or kicked in time
    Ok,
    /// Armed and not kicked within the timeout
    Expired,
}

/// Device-side model of the host watchdog
#[derive(Debug, Clone)]
pub struct HostWatchdog {
    armed: bool,
    timeout_s: u32,
    min_s: u32,
    max_s: u32,
    last_kick_ms: u32,
}

impl HostWatchdog {
    /// Create a disarmed watchdog with the configured default timeout
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            armed: false,
            timeout_s: config.watchdog_default_s,
            min_s: config.watchdog_min_s,
            max_s: config.watchdog_max_s,
            last_kick_ms: 0,
        }
    }

    /// Arm and reset the timer
    pub fn start(&mut self, now_ms: u32) {
        self.armed = true;
        self.last_kick_ms = now_ms;
        debug!("watchdog armed, timeout {}s", self.timeout_s);
    }

    /// Disarm
    pub fn stop(&mut self) {
        if self.armed {
            debug!("watchdog disarmed");
        }
        self.armed = false;
    }

    /// Reset the timer
    pub fn kick(&mut self, now_ms: u32) {
        self.last_kick_ms = now_ms;
    }

    /// Apply a new timeout, clamped to the configured range
    ///
    /// Returns the timeout actually applied.
    pub fn set_timeout_s(&mut self, requested_s: u64) -> u32 {
        let clamped = requested_s.clamp(self.min_s as u64, self.max_s as u64) as u32;
        if clamped as u64 != requested_s {
            warn!("watchdog timeout {}s out of range, using {}s", requested_s, clamped);
        }
        self.timeout_s = clamped;
        clamped
    }

    pub fn timeout_s(&self) -> u32 {
        self.timeout_s
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Update from a received message
    ///
    /// Returns the RESPONSE to send back when the message set the timeout.
    pub fn handle(&mut self, message: &Message, now_ms: u32) -> Option<Message> {
        match &message.payload {
            Payload::Command(opcode) => {
                match Command::from_u16(*opcode) {
                    Some(Command::WdStart) => self.start(now_ms),
                    Some(Command::WdStop) => self.stop(),
                    Some(Command::WdKick) | Some(Command::Heartbeat) => self.kick(now_ms),
                    _ => {}
                }
                None
            }
            Payload::Response(response) if response.param == Command::WdSetTimeout.to_u16() => {
                let applied = self.set_timeout_s(response.value);
                // A new timeout restarts the current period
                self.kick(now_ms);
                Some(Message::response(
                    Recipient::Linux,
                    Command::WdSetTimeout.to_u16(),
                    applied as u64,
                ))
            }
            _ => None,
        }
    }

    /// Check for expiry
    ///
    /// Reports [`WatchdogStatus::Expired`] once and disarms.
    pub fn check(&mut self, now_ms: u32) -> WatchdogStatus {
        if !self.armed {
            return WatchdogStatus::Ok;
        }

        let timeout_ms = self.timeout_s.saturating_mul(1000);
        if now_ms.wrapping_sub(self.last_kick_ms) > timeout_ms {
            self.armed = false;
            return WatchdogStatus::Expired;
        }
        WatchdogStatus::Ok
    }
}
