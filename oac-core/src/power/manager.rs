//! Power manager
//!
//! Owns the lifecycle state and everything it switches: the host power
//! rail, the status LED, the host watchdog and the shutdown handshake.
//! Driven by three inputs, each carrying a monotonic millisecond timestamp:
//! button presses, messages from the host, and periodic ticks. Messages for
//! the host are queued and drained by the caller with
//! [`PowerManager::pop_outgoing`].

use heapless::Deque;
use oac_hal::{InputPin, OutputPin};
use oac_protocol::{Command, Message, Payload, Recipient, StatusBody};

use super::shutdown::{LineIdleMonitor, ShutdownProgress};
use crate::config::DeviceConfig;
use crate::error::{ErrorCode, ErrorHandler, Origin};
use crate::safety::{HostWatchdog, WatchdogStatus};
use crate::state::{DeviceState, Event, Press};
use crate::traits::{Animation, BatteryGauge, Color, Indicator};

/// Default number of queued outgoing messages
pub const OUTBOX_DEPTH: usize = 8;

/// Device lifecycle controller
pub struct PowerManager<R, L, I, B, const N: usize = OUTBOX_DEPTH>
where
    R: OutputPin,
    L: InputPin,
    I: Indicator,
    B: BatteryGauge,
{
    state: DeviceState,
    config: DeviceConfig,
    /// Gate of the host power switch, high = powered
    rail: R,
    /// Host TX line, sampled only while shutting down
    line: L,
    indicator: I,
    gauge: B,
    errors: ErrorHandler,
    watchdog: HostWatchdog,
    shutdown: Option<LineIdleMonitor>,
    startup_started_at: u32,
    shutdown_requested_at: u32,
    shutdown_ack_at: u32,
    last_status_at: u32,
    outbox: Deque<Message, N>,
}

impl<R, L, I, B, const N: usize> PowerManager<R, L, I, B, N>
where
    R: OutputPin,
    L: InputPin,
    I: Indicator,
    B: BatteryGauge,
{
    /// Create a manager in `LowPower` with the rail off
    pub fn new(mut rail: R, line: L, mut indicator: I, gauge: B, config: DeviceConfig) -> Self {
        rail.set_low();
        indicator.off();

        Self {
            state: DeviceState::LowPower,
            watchdog: HostWatchdog::new(&config),
            config,
            rail,
            line,
            indicator,
            gauge,
            errors: ErrorHandler::new(Origin::Device),
            shutdown: None,
            startup_started_at: 0,
            shutdown_requested_at: 0,
            shutdown_ack_at: 0,
            last_status_at: 0,
            outbox: Deque::new(),
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Active error code, 0 if none
    pub fn current_error(&self) -> u8 {
        self.errors.current()
    }

    /// True while the link must stay silent for line sensing
    pub fn link_suspended(&self) -> bool {
        self.state == DeviceState::Shutdown
    }

    pub fn rail(&self) -> &R {
        &self.rail
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn watchdog(&self) -> &HostWatchdog {
        &self.watchdog
    }

    /// When the host acknowledged the last shutdown request
    pub fn shutdown_ack_at(&self) -> u32 {
        self.shutdown_ack_at
    }

    /// Next message queued for the host
    pub fn pop_outgoing(&mut self) -> Option<Message> {
        self.outbox.pop_front()
    }

    /// Handle a classified button press
    ///
    /// While the host is up, presses are also forwarded to it.
    pub fn handle_button(&mut self, press: Press, now_ms: u32) {
        if matches!(self.state, DeviceState::Ready | DeviceState::Recording) {
            let command = match press {
                Press::Short => Command::BtnShort,
                Press::Long => Command::BtnLong,
            };
            self.send(command);
        }
        self.fire(Event::Button(press), now_ms);
    }

    /// Handle a message received from the host
    pub fn handle_message(&mut self, message: &Message, now_ms: u32) {
        if let Some(reply) = self.watchdog.handle(message, now_ms) {
            self.queue(reply);
        }

        match &message.payload {
            Payload::Command(opcode) => match Command::from_u16(*opcode) {
                Some(command) if command.is_keepalive() => self.fire(Event::HostAlive, now_ms),
                Some(Command::ShutdownStarted) => self.fire(Event::ShutdownStarted, now_ms),
                Some(Command::RecordStarted) => info!("host started recording"),
                Some(Command::RecordEnded) => info!("host stopped recording"),
                Some(command) => trace!("command {} handled elsewhere", command),
                None => warn!("unknown opcode {}", opcode),
            },
            // Code 0 means "no error"
            Payload::Error(body) if body.code == 0 => debug!("host reported no error"),
            Payload::Error(body) => {
                warn!("host reported error {}: {}", body.code, body.text.as_str());
                self.fire(Event::HostError(ErrorCode::from_u8(body.code)), now_ms);
            }
            _ => trace!("ignoring {}", message.msg_type()),
        }
    }

    /// Raise a fault detected on the device
    pub fn raise(&mut self, code: ErrorCode, now_ms: u32) {
        self.fire(Event::ErrorDetected(code), now_ms);
    }

    /// Clear the active error and return to `LowPower`
    pub fn reset_error(&mut self, now_ms: u32) {
        if self.errors.active().is_some() {
            self.fire(Event::ErrorCleared, now_ms);
        }
    }

    /// Evaluate timers; call periodically
    pub fn tick(&mut self, now_ms: u32) {
        match self.state {
            DeviceState::Startup => {
                if now_ms.wrapping_sub(self.startup_started_at) > self.config.startup_timeout_ms {
                    self.fire(Event::StartupTimeout, now_ms);
                }
            }
            DeviceState::ShutdownRequest => {
                if now_ms.wrapping_sub(self.shutdown_requested_at)
                    > self.config.shutdown_request_timeout_ms
                {
                    self.fire(Event::ShutdownRequestTimeout, now_ms);
                }
            }
            DeviceState::Shutdown => self.poll_shutdown(now_ms),
            DeviceState::Ready | DeviceState::Recording => {
                if self.watchdog.check(now_ms) == WatchdogStatus::Expired {
                    warn!("host watchdog expired");
                    self.fire(Event::WatchdogExpired, now_ms);
                } else {
                    self.check_battery(now_ms);
                }
            }
            DeviceState::LowPower | DeviceState::Error(_) => {}
        }

        if self.state.host_online()
            && now_ms.wrapping_sub(self.last_status_at) >= self.config.status_interval_ms
        {
            self.last_status_at = now_ms;
            self.queue(self.status());
        }
    }

    /// Current STATUS report
    pub fn status(&self) -> Message {
        Message::status(
            Recipient::Linux,
            StatusBody {
                battery_uv: self.gauge.battery_uv().unwrap_or(0),
                state: self.state.code(),
                charging: self.gauge.is_charging(),
                error_code: self.errors.current(),
            },
        )
    }

    fn poll_shutdown(&mut self, now_ms: u32) {
        let line_high = self.line.is_high();
        let progress = match self.shutdown.as_mut() {
            Some(monitor) => monitor.sample(line_high, now_ms),
            None => return,
        };

        match progress {
            ShutdownProgress::Pending => {}
            ShutdownProgress::Confirmed => {
                info!("host TX idle, cutting power");
                self.fire(Event::LineIdleConfirmed, now_ms);
            }
            ShutdownProgress::TimedOut => {
                warn!("shutdown timeout reached");
                self.fire(Event::ShutdownTimeout, now_ms);
            }
        }
    }

    fn check_battery(&mut self, now_ms: u32) {
        let Some(uv) = self.gauge.battery_uv() else {
            return;
        };
        if uv < self.config.low_battery_uv {
            self.raise(ErrorCode::LowBattery, now_ms);
        } else if uv > self.config.over_voltage_uv {
            self.raise(ErrorCode::BatteryOverVoltage, now_ms);
        }
    }

    fn fire(&mut self, event: Event, now_ms: u32) {
        let prev = self.state;
        let next = prev.transition(event);
        if next == prev {
            return;
        }

        info!("{} -> {} on {}", prev, next, event);
        if prev == DeviceState::Shutdown {
            self.shutdown = None;
        }
        self.state = next;
        self.enter(prev, event, now_ms);
    }

    fn enter(&mut self, prev: DeviceState, event: Event, now_ms: u32) {
        match self.state {
            DeviceState::LowPower => {
                self.rail.set_low();
                self.watchdog.stop();
                self.errors.reset(&mut self.indicator);
                self.indicator.off();
                self.outbox.clear();
            }
            DeviceState::Startup => {
                self.rail.set_high();
                self.startup_started_at = now_ms;
                self.indicator.set_animation(Some(Animation::Rainbow));
            }
            DeviceState::Ready => {
                if prev == DeviceState::Recording {
                    self.send(Command::RecordReqEnd);
                }
                if prev == DeviceState::Startup {
                    self.last_status_at = now_ms;
                }
                self.indicator.set_animation(None);
                self.indicator.set_color(Color::GREEN);
            }
            DeviceState::Recording => {
                self.send(Command::RecordReqStart);
                self.indicator.set_animation(None);
                self.indicator.set_color(Color::WHITE);
            }
            DeviceState::ShutdownRequest => {
                if prev == DeviceState::Recording {
                    self.send(Command::RecordReqEnd);
                }
                self.send(Command::ShutdownReq);
                self.shutdown_requested_at = now_ms;
                self.indicator.set_animation(Some(Animation::Rainbow));
            }
            DeviceState::Shutdown => {
                self.shutdown_ack_at = now_ms;
                self.watchdog.stop();
                // Nothing may be transmitted while the line is sensed
                self.outbox.clear();
                self.indicator.set_animation(Some(Animation::Rainbow));
                self.shutdown = Some(LineIdleMonitor::new(
                    now_ms,
                    self.config.shutdown_confirm_ms,
                    self.config.shutdown_timeout_ms,
                ));
                self.poll_shutdown(now_ms);
            }
            DeviceState::Error(code) => {
                match event {
                    Event::HostError(_) => self.errors.accept(code, &mut self.indicator),
                    _ => self
                        .errors
                        .raise(code, &mut self.indicator, &mut self.outbox),
                };
            }
        }
    }

    fn send(&mut self, command: Command) {
        self.queue(Message::command(Recipient::Linux, command));
    }

    fn queue(&mut self, message: Message) {
        if self.outbox.push_back(message).is_err() {
            warn!("outbox full, dropping message");
        }
    }
}
