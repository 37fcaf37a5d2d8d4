//! Message fan-out
//!
//! Every message the reassembler produces is broadcast to the registered
//! consumers in registration order. Consumers must return quickly: anything
//! long-running is handed off, usually by queueing the message on a
//! [`Channel`](embassy_sync::channel::Channel), which implements
//! [`Consumer`] directly.

mod dispatcher;
mod registry;

pub use dispatcher::{Dispatcher, SendError};
pub use registry::{Handle, Registry, RegistryError, MAX_CONSUMERS};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use oac_protocol::Message;

/// Receiver of dispatched messages
pub trait Consumer: Sync {
    /// Observe one message; must not block
    fn on_message(&self, message: &Message);
}

impl<M: RawMutex + Sync, const N: usize> Consumer for Channel<M, Message, N> {
    fn on_message(&self, message: &Message) {
        if self.try_send(message.clone()).is_err() {
            warn!("consumer queue full, dropping {}", message.msg_type());
        }
    }
}
