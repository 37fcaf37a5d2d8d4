//! Dispatcher: registry plus link writer behind one lock each

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use oac_hal::UartTx;
use oac_protocol::{FrameError, Message};

use super::registry::{Handle, Registry, RegistryError, MAX_CONSUMERS};
use super::Consumer;

/// Failure to send a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// Message could not be framed
    Frame(FrameError),
    /// Link write failed
    Link(E),
}

impl<E> From<FrameError> for SendError<E> {
    fn from(err: FrameError) -> Self {
        SendError::Frame(err)
    }
}

/// Broadcasts received messages and frames outgoing ones
///
/// `register`, `unregister` and `dispatch` may be called from different
/// contexts; the registry is only touched under its lock. `dispatch` copies
/// the consumer list under the lock and calls the consumers after releasing
/// it, so a consumer may register or unregister from its callback.
pub struct Dispatcher<'a, M: RawMutex, W: UartTx, const N: usize = MAX_CONSUMERS> {
    registry: Mutex<M, RefCell<Registry<'a, N>>>,
    link: Mutex<M, RefCell<W>>,
}

impl<'a, M: RawMutex, W: UartTx, const N: usize> Dispatcher<'a, M, W, N> {
    pub fn new(link: W) -> Self {
        Self {
            registry: Mutex::new(RefCell::new(Registry::new())),
            link: Mutex::new(RefCell::new(link)),
        }
    }

    /// Add a consumer at the end of the delivery order
    pub fn register(&self, consumer: &'a dyn Consumer) -> Result<Handle, RegistryError> {
        self.registry
            .lock(|registry| registry.borrow_mut().register(consumer))
    }

    /// Remove a consumer; no-op if it is already gone
    pub fn unregister(&self, handle: Handle) {
        let removed = self
            .registry
            .lock(|registry| registry.borrow_mut().unregister(handle));
        if !removed {
            debug!("unregister of stale handle ignored");
        }
    }

    /// Number of registered consumers
    pub fn consumers(&self) -> usize {
        self.registry.lock(|registry| registry.borrow().len())
    }

    /// Deliver a message to every registered consumer
    ///
    /// Returns the number of consumers that observed it.
    pub fn dispatch(&self, message: &Message) -> usize {
        let snapshot: Vec<&'a dyn Consumer, N> = self
            .registry
            .lock(|registry| registry.borrow().iter().collect());

        trace!("dispatching {} to {} consumers", message.msg_type(), snapshot.len());
        for consumer in &snapshot {
            consumer.on_message(message);
        }
        snapshot.len()
    }

    /// Frame a message and write it to the link
    ///
    /// Errors are returned to the caller; nothing is retried.
    pub fn send(&self, message: &Message) -> Result<(), SendError<W::Error>> {
        let bytes = message.encode_to_vec()?;
        self.link
            .lock(|link| {
                let mut link = link.borrow_mut();
                link.write_blocking(&bytes)?;
                link.flush()
            })
            .map_err(SendError::Link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use oac_protocol::{Command, Payload, Recipient, FRAME_END, FRAME_START};

    #[derive(Default)]
    struct MockLink {
        written: std::vec::Vec<u8>,
        flushes: usize,
        fail: bool,
    }

    #[derive(Debug, PartialEq)]
    struct LinkDown;

    impl UartTx for MockLink {
        type Error = LinkDown;

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), LinkDown> {
            if self.fail {
                return Err(LinkDown);
            }
            self.written.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), LinkDown> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Counter {
        seen: AtomicUsize,
    }

    impl Consumer for Counter {
        fn on_message(&self, _message: &Message) {
            self.seen.fetch_add(1, Ordering::Relaxed);
        }
    }

    type TestDispatcher<'a> = Dispatcher<'a, NoopRawMutex, MockLink>;

    fn heartbeat() -> Message {
        Message::command(Recipient::Firmware, Command::Heartbeat)
    }

    #[test]
    fn test_dispatch_reaches_all_consumers() {
        let (a, b) = (Counter::default(), Counter::default());
        let dispatcher = TestDispatcher::new(MockLink::default());
        dispatcher.register(&a).unwrap();
        dispatcher.register(&b).unwrap();

        assert_eq!(dispatcher.dispatch(&heartbeat()), 2);
        assert_eq!(a.seen.load(Ordering::Relaxed), 1);
        assert_eq!(b.seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unregistered_consumer_not_called() {
        let (a, b) = (Counter::default(), Counter::default());
        let dispatcher = TestDispatcher::new(MockLink::default());
        let ha = dispatcher.register(&a).unwrap();
        dispatcher.register(&b).unwrap();
        dispatcher.unregister(ha);
        dispatcher.unregister(ha);

        assert_eq!(dispatcher.dispatch(&heartbeat()), 1);
        assert_eq!(a.seen.load(Ordering::Relaxed), 0);
        assert_eq!(dispatcher.consumers(), 1);
    }

    #[test]
    fn test_registry_full() {
        let a = Counter::default();
        let dispatcher = TestDispatcher::new(MockLink::default());
        for _ in 0..MAX_CONSUMERS {
            dispatcher.register(&a).unwrap();
        }
        assert_eq!(dispatcher.register(&a), Err(RegistryError::Full));
        assert_eq!(dispatcher.dispatch(&heartbeat()), MAX_CONSUMERS);
    }

    #[test]
    fn test_channel_consumer_queues_copy() {
        let inbox: embassy_sync::channel::Channel<
            embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
            Message,
            2,
        > = embassy_sync::channel::Channel::new();
        let dispatcher = TestDispatcher::new(MockLink::default());
        dispatcher.register(&inbox).unwrap();

        for _ in 0..3 {
            dispatcher.dispatch(&heartbeat());
        }
        // Third message dropped, queue bounded
        assert_eq!(inbox.try_receive(), Ok(heartbeat()));
        assert_eq!(inbox.try_receive(), Ok(heartbeat()));
        assert!(inbox.try_receive().is_err());
    }

    #[test]
    fn test_send_writes_frame() {
        let dispatcher = TestDispatcher::new(MockLink::default());
        let msg = Message::command(Recipient::Linux, Command::RecordReqStart);
        dispatcher.send(&msg).unwrap();

        dispatcher.link.lock(|link| {
            let link = link.borrow();
            assert_eq!(link.written, [FRAME_START, 0x01, 0x01, 0x02, 0x00, 0xF0, 0xF2, FRAME_END]);
            assert_eq!(link.flushes, 1);
            assert_eq!(Message::decode(&link.written).unwrap().payload, Payload::Command(0xF000));
        });
    }

    #[test]
    fn test_send_surfaces_link_error() {
        let dispatcher = TestDispatcher::new(MockLink {
            fail: true,
            ..MockLink::default()
        });
        assert_eq!(dispatcher.send(&heartbeat()), Err(SendError::Link(LinkDown)));
    }
}
