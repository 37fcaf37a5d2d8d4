//! Consumer registry
//!
//! Slots live in a fixed arena and are threaded into a doubly linked list
//! in registration order, so both `register` and `unregister` are O(1).
//! Handles carry the slot generation; a stale handle never removes the
//! consumer that later reused its slot.

use heapless::Vec;

use super::Consumer;

/// Maximum number of consumers registered at once
pub const MAX_CONSUMERS: usize = 12;

/// Registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Every slot is taken
    Full,
}

/// Ticket returned by `register`, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handle {
    index: u8,
    generation: u16,
}

#[derive(Clone, Copy)]
struct Slot<'a> {
    consumer: Option<&'a dyn Consumer>,
    generation: u16,
    prev: Option<u8>,
    next: Option<u8>,
}

impl Slot<'_> {
    const EMPTY: Self = Self {
        consumer: None,
        generation: 0,
        prev: None,
        next: None,
    };
}

/// Ordered set of consumers with stable handles
pub struct Registry<'a, const N: usize = MAX_CONSUMERS> {
    slots: [Slot<'a>; N],
    head: Option<u8>,
    tail: Option<u8>,
    /// Unused slot indices, lowest on top
    free: Vec<u8, N>,
}

impl<'a, const N: usize> Registry<'a, N> {
    const INDEX_FITS: () = assert!(N <= u8::MAX as usize + 1, "registry capacity exceeds u8 index");

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::INDEX_FITS;

        let mut free = Vec::new();
        for index in (0..N).rev() {
            // Capacity is N, exactly one push per slot
            let _ = free.push(index as u8);
        }

        Self {
            slots: [Slot::EMPTY; N],
            head: None,
            tail: None,
            free,
        }
    }

    pub fn len(&self) -> usize {
        N - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Append a consumer to the delivery order
    pub fn register(&mut self, consumer: &'a dyn Consumer) -> Result<Handle, RegistryError> {
        let index = self.free.pop().ok_or(RegistryError::Full)?;

        let slot = &mut self.slots[index as usize];
        slot.consumer = Some(consumer);
        slot.prev = self.tail;
        slot.next = None;
        let handle = Handle {
            index,
            generation: slot.generation,
        };

        match self.tail {
            Some(tail) => self.slots[tail as usize].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);

        Ok(handle)
    }

    /// Remove a consumer
    ///
    /// Returns false if the handle was already unregistered.
    pub fn unregister(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.consumer.is_none() || slot.generation != handle.generation {
            return false;
        }

        slot.consumer = None;
        slot.generation = slot.generation.wrapping_add(1);
        let prev = slot.prev.take();
        let next = slot.next.take();

        match prev {
            Some(prev) => self.slots[prev as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next as usize].prev = prev,
            None => self.tail = prev,
        }

        // The slot was taken, so the free stack has room for it
        let _ = self.free.push(handle.index);
        true
    }

    /// Consumers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &'a dyn Consumer> + '_ {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let slot = &self.slots[cursor? as usize];
            cursor = slot.next;
            slot.consumer
        })
    }
}

impl<const N: usize> Default for Registry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oac_protocol::{Command, Message, Recipient};
    use std::sync::Mutex;

    /// Appends its id to a shared log for every message
    struct Tagged<'l> {
        id: u8,
        log: &'l Mutex<std::vec::Vec<u8>>,
    }

    impl Consumer for Tagged<'_> {
        fn on_message(&self, _message: &Message) {
            self.log.lock().unwrap().push(self.id);
        }
    }

    fn delivery_order<const N: usize>(
        registry: &Registry<'_, N>,
        log: &Mutex<std::vec::Vec<u8>>,
    ) -> std::vec::Vec<u8> {
        log.lock().unwrap().clear();
        let msg = Message::command(Recipient::Firmware, Command::Heartbeat);
        for consumer in registry.iter() {
            consumer.on_message(&msg);
        }
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_registration_order() {
        let log = Mutex::new(std::vec::Vec::new());
        let (a, b, c) = (
            Tagged { id: 1, log: &log },
            Tagged { id: 2, log: &log },
            Tagged { id: 3, log: &log },
        );
        let mut registry: Registry<'_, 4> = Registry::new();
        registry.register(&a).unwrap();
        registry.register(&b).unwrap();
        registry.register(&c).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(delivery_order(&registry, &log), [1, 2, 3]);
    }

    #[test]
    fn test_full() {
        let log = Mutex::new(std::vec::Vec::new());
        let consumer = Tagged { id: 0, log: &log };
        let mut registry: Registry<'_> = Registry::new();
        for _ in 0..MAX_CONSUMERS {
            registry.register(&consumer).unwrap();
        }
        assert!(registry.is_full());
        assert_eq!(registry.register(&consumer), Err(RegistryError::Full));
    }

    #[test]
    fn test_unregister_middle_keeps_order() {
        let log = Mutex::new(std::vec::Vec::new());
        let (a, b, c) = (
            Tagged { id: 1, log: &log },
            Tagged { id: 2, log: &log },
            Tagged { id: 3, log: &log },
        );
        let mut registry: Registry<'_, 4> = Registry::new();
        registry.register(&a).unwrap();
        let hb = registry.register(&b).unwrap();
        registry.register(&c).unwrap();

        assert!(registry.unregister(hb));
        assert_eq!(delivery_order(&registry, &log), [1, 3]);

        // Reused slot goes to the back of the order
        registry.register(&b).unwrap();
        assert_eq!(delivery_order(&registry, &log), [1, 3, 2]);
    }

    #[test]
    fn test_unregister_head_and_tail() {
        let log = Mutex::new(std::vec::Vec::new());
        let (a, b) = (Tagged { id: 1, log: &log }, Tagged { id: 2, log: &log });
        let mut registry: Registry<'_, 2> = Registry::new();
        let ha = registry.register(&a).unwrap();
        let hb = registry.register(&b).unwrap();
        assert!(registry.unregister(hb));
        assert_eq!(delivery_order(&registry, &log), [1]);
        assert!(registry.unregister(ha));
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_unregister_twice_is_noop() {
        let log = Mutex::new(std::vec::Vec::new());
        let (a, b) = (Tagged { id: 1, log: &log }, Tagged { id: 2, log: &log });
        let mut registry: Registry<'_, 1> = Registry::new();
        let stale = registry.register(&a).unwrap();
        assert!(registry.unregister(stale));
        assert!(!registry.unregister(stale));

        // Stale handle must not remove the slot's new owner
        registry.register(&b).unwrap();
        assert!(!registry.unregister(stale));
        assert_eq!(delivery_order(&registry, &log), [2]);
    }
}
