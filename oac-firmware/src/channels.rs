//! Inter-task communication channels
//!
//! Defines the statics shared between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, AtomicU32};

use oac_core::state::Press;
use oac_protocol::Message;

use crate::tasks::led::LedState;

/// Channel capacity for messages from the host
const INBOX_SIZE: usize = 8;

/// Channel capacity for classified button presses
const BUTTON_CHANNEL_SIZE: usize = 4;

/// Messages from the host, registered with the dispatcher
pub static INBOX: Channel<CriticalSectionRawMutex, Message, INBOX_SIZE> = Channel::new();

/// Classified button presses
pub static BUTTON_CHANNEL: Channel<CriticalSectionRawMutex, Press, BUTTON_CHANNEL_SIZE> =
    Channel::new();

/// Requested LED output (updated by controller)
pub static LED_STATE: Signal<CriticalSectionRawMutex, LedState> = Signal::new();

/// Set while the host TX line is being sensed; link RX discards everything
pub static LINK_SUSPENDED: AtomicBool = AtomicBool::new(false);

/// Last battery reading in microvolts, 0 before the first sample
pub static BATTERY_UV: AtomicU32 = AtomicU32::new(0);

/// Charger active
pub static CHARGING: AtomicBool = AtomicBool::new(false);
