//! Button input fed by forwarded BTN_* commands

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;
use oac_protocol::{Command, Message};

use crate::dispatch::Consumer;

/// Key reported to the host input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Short press, start or stop recording
    Prog1,
    /// Long press, power off
    Power,
}

impl Key {
    pub fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::BtnShort => Some(Key::Prog1),
            Command::BtnLong => Some(Key::Power),
            _ => None,
        }
    }
}

/// Bounded queue of key presses; the oldest press is dropped when full
pub struct ButtonInput<M: RawMutex, const N: usize = 8> {
    keys: Mutex<M, RefCell<Deque<Key, N>>>,
}

impl<M: RawMutex, const N: usize> ButtonInput<M, N> {
    pub const fn new() -> Self {
        Self {
            keys: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Take the oldest pending key press
    pub fn pop_key(&self) -> Option<Key> {
        self.keys.lock(|keys| keys.borrow_mut().pop_front())
    }

    pub fn pending(&self) -> usize {
        self.keys.lock(|keys| keys.borrow().len())
    }
}

impl<M: RawMutex, const N: usize> Default for ButtonInput<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex + Sync, const N: usize> Consumer for ButtonInput<M, N> {
    fn on_message(&self, message: &Message) {
        let Some(key) = message.as_command().and_then(Key::from_command) else {
            return;
        };

        self.keys.lock(|keys| {
            let mut keys = keys.borrow_mut();
            if keys.is_full() {
                keys.pop_front();
            }
            let _ = keys.push_back(key);
        });
    }
}
