//! Sticky error state and operator alert

use heapless::Deque;
use oac_protocol::{Message, Recipient};

use super::codes::{ErrorCode, Origin};
use crate::traits::{Animation, Color, Indicator};

/// Holds the active error and drives the LED alert for it
///
/// The handler never changes the lifecycle state itself; callers move the
/// state machine when [`ErrorHandler::raise`] or [`ErrorHandler::reset`]
/// report a change.
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    /// Processor this handler runs on
    origin: Origin,
    /// Peer that receives relayed errors
    peer: Recipient,
    current: Option<ErrorCode>,
}

impl ErrorHandler {
    /// Create a handler for the processor identified by `origin`
    pub fn new(origin: Origin) -> Self {
        let peer = match origin {
            Origin::Device => Recipient::Linux,
            Origin::Host => Recipient::Firmware,
        };
        Self {
            origin,
            peer,
            current: None,
        }
    }

    /// Active error code, 0 if none
    pub fn current(&self) -> u8 {
        self.current.map_or(0, ErrorCode::code)
    }

    /// Active error, if any
    pub fn active(&self) -> Option<ErrorCode> {
        self.current
    }

    /// Raise an error detected on this processor
    ///
    /// Re-raising the active code does nothing. Otherwise the alert is
    /// started and, for codes this processor owns, an ERROR message for the
    /// peer is queued on `outbox`. Returns true if the error is new.
    pub fn raise<I: Indicator, const N: usize>(
        &mut self,
        code: ErrorCode,
        indicator: &mut I,
        outbox: &mut Deque<Message, N>,
    ) -> bool {
        if !self.activate(code, indicator) {
            return false;
        }

        if code.origin() == Some(self.origin) {
            let message = Message::error(self.peer, code.code(), code.message());
            if outbox.push_back(message).is_err() {
                warn!("outbox full, error {} not relayed", code.code());
            }
        }
        true
    }

    /// Accept an error reported by the peer
    ///
    /// Same as [`ErrorHandler::raise`] but never relays the error back.
    pub fn accept<I: Indicator>(&mut self, code: ErrorCode, indicator: &mut I) -> bool {
        self.activate(code, indicator)
    }

    /// Clear the active error and stop the alert
    ///
    /// Returns false if no error was active.
    pub fn reset<I: Indicator>(&mut self, indicator: &mut I) -> bool {
        if self.current.take().is_none() {
            return false;
        }
        indicator.set_animation(None);
        indicator.off();
        info!("error reset");
        true
    }

    fn activate<I: Indicator>(&mut self, code: ErrorCode, indicator: &mut I) -> bool {
        if self.current() == code.code() {
            return false;
        }

        error!("[ERROR] {}: {}", code.code(), code.message());
        self.current = Some(code);
        indicator.set_color(Color::RED);
        indicator.set_animation(Some(Animation::Blink { count: code.code() }));
        true
    }
}
