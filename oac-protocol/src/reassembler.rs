//! Byte-stream reassembly
//!
//! Turns the raw bytes arriving from the link, in chunks of any size, into
//! decoded [`Message`]s. Stray bytes outside a frame are dropped one at a
//! time, so a glitch never costs more than itself. A partial frame that
//! stalls for longer than [`MAX_MESSAGE_TIMEOUT_MS`] is discarded.

use crate::frame::{FrameError, FRAME_OVERHEAD, FRAME_START, LENGTH_INDEX, MAX_FRAME_SIZE};
use crate::message::Message;
use heapless::Vec;

/// Maximum gap between two bytes of the same frame
pub const MAX_MESSAGE_TIMEOUT_MS: u32 = 100;

/// Why a candidate frame was dropped
///
/// These are diagnostics only. The reassembler has already resynchronized
/// by the time the caller sees one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReassemblyError {
    /// Partial frame went stale
    Timeout,
    /// LENGTH byte announced a frame larger than the receive buffer
    BufferOverflow,
    /// Complete frame failed to decode
    Corrupt(FrameError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    Idle,
    /// Accumulating a candidate frame
    Filling,
}

/// Incremental frame parser with inter-byte timeout
pub struct Reassembler {
    state: ParseState,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    last_byte_ms: u32,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    /// Create a new reassembler
    pub fn new() -> Self {
        Self {
            state: ParseState::Idle,
            buffer: Vec::new(),
            last_byte_ms: 0,
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.buffer.clear();
    }

    /// True while a partial frame is buffered
    pub fn is_filling(&self) -> bool {
        self.state == ParseState::Filling
    }

    /// Expire a stale partial frame
    ///
    /// Call once per loop iteration even when no bytes arrived so a stalled
    /// frame is released without waiting for the next byte.
    pub fn poll(&mut self, now_ms: u32) -> Result<(), ReassemblyError> {
        if self.state == ParseState::Filling
            && now_ms.wrapping_sub(self.last_byte_ms) > MAX_MESSAGE_TIMEOUT_MS
        {
            self.reset();
            return Err(ReassemblyError::Timeout);
        }
        Ok(())
    }

    /// Feed a single byte received at `now_ms`
    ///
    /// Returns `Ok(Some(message))` when the byte completes a valid frame,
    /// `Ok(None)` when more bytes are needed. On `Err` the parser is
    /// already back in its idle state. The byte that reveals a timeout is
    /// still processed, so a START arriving after a stall opens a new frame.
    pub fn feed(&mut self, byte: u8, now_ms: u32) -> Result<Option<Message>, ReassemblyError> {
        let timed_out = self.poll(now_ms);

        match self.state {
            ParseState::Idle => {
                if byte == FRAME_START {
                    self.buffer.clear();
                    // Cannot fail: buffer was just cleared
                    let _ = self.buffer.push(byte);
                    self.state = ParseState::Filling;
                    self.last_byte_ms = now_ms;
                }
                // Silently ignore non-START bytes while idle
                timed_out.map(|_| None)
            }
            ParseState::Filling => {
                self.last_byte_ms = now_ms;
                if self.buffer.push(byte).is_err() {
                    self.reset();
                    return Err(ReassemblyError::BufferOverflow);
                }

                if self.buffer.len() <= LENGTH_INDEX {
                    return Ok(None);
                }

                let frame_len = FRAME_OVERHEAD + self.buffer[LENGTH_INDEX] as usize;
                if frame_len > self.buffer.capacity() {
                    self.reset();
                    return Err(ReassemblyError::BufferOverflow);
                }
                if self.buffer.len() < frame_len {
                    return Ok(None);
                }

                let result = Message::decode(&self.buffer);
                self.reset();
                result.map(Some).map_err(ReassemblyError::Corrupt)
            }
        }
    }

    /// Feed bytes until one message or error is produced
    ///
    /// Returns the outcome together with the bytes not yet consumed. Call
    /// again with the remainder until it is empty; nothing is buffered
    /// beyond the current partial frame.
    pub fn feed_bytes<'b>(
        &mut self,
        bytes: &'b [u8],
        now_ms: u32,
    ) -> (Result<Option<Message>, ReassemblyError>, &'b [u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.feed(byte, now_ms) {
                Ok(None) => {}
                outcome => return (outcome, &bytes[i + 1..]),
            }
        }
        (Ok(None), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::frame::{checksum, FRAME_END, TYPE_COMMAND};
    use crate::message::{Payload, Recipient};
    use proptest::prelude::*;

    fn record_start() -> Message {
        Message::command(Recipient::Linux, Command::RecordReqStart)
    }

    fn feed_all(r: &mut Reassembler, bytes: &[u8], now_ms: u32) -> heapless::Vec<Message, 8> {
        let mut out = heapless::Vec::new();
        let mut rest = bytes;
        while !rest.is_empty() {
            let (outcome, remainder) = r.feed_bytes(rest, now_ms);
            if let Ok(Some(msg)) = outcome {
                out.push(msg).unwrap();
            }
            rest = remainder;
        }
        out
    }

    #[test]
    fn test_byte_by_byte() {
        let msg = record_start();
        let encoded = msg.encode_to_vec().unwrap();
        let mut r = Reassembler::new();

        for (i, &b) in encoded.iter().enumerate() {
            let result = r.feed(b, i as u32).unwrap();
            if i + 1 < encoded.len() {
                assert_eq!(result, None);
            } else {
                assert_eq!(result, Some(msg.clone()));
            }
        }
        assert!(!r.is_filling());
    }

    #[test]
    fn test_leading_garbage_dropped() {
        let msg = record_start();
        let encoded = msg.encode_to_vec().unwrap();
        let mut r = Reassembler::new();

        for b in [0x00, 0x13, FRAME_END, 0xFF] {
            assert_eq!(r.feed(b, 0), Ok(None));
            assert!(!r.is_filling());
        }
        let (result, rest) = r.feed_bytes(&encoded, 0);
        assert_eq!(result, Ok(Some(msg)));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_two_frames_in_one_chunk() {
        let a = record_start();
        let b = Message::command(Recipient::Firmware, Command::WdKick);
        let mut chunk = heapless::Vec::<u8, 32>::new();
        chunk.extend_from_slice(&a.encode_to_vec().unwrap()).unwrap();
        chunk.extend_from_slice(&b.encode_to_vec().unwrap()).unwrap();

        let mut r = Reassembler::new();
        let (first, rest) = r.feed_bytes(&chunk, 0);
        assert_eq!(first, Ok(Some(a)));
        assert_eq!(rest.len(), 8);
        let (second, rest) = r.feed_bytes(rest, 0);
        assert_eq!(second, Ok(Some(b)));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_split_across_chunks() {
        let msg = Message::error(Recipient::Linux, 15, "No camera detected.");
        let encoded = msg.encode_to_vec().unwrap();
        let mut r = Reassembler::new();

        let (result, _) = r.feed_bytes(&encoded[..5], 0);
        assert_eq!(result, Ok(None));
        let (result, _) = r.feed_bytes(&encoded[5..12], 10);
        assert_eq!(result, Ok(None));
        let (result, _) = r.feed_bytes(&encoded[12..], 20);
        assert_eq!(result, Ok(Some(msg)));
    }

    #[test]
    fn test_timeout_discards_partial_frame() {
        let msg = record_start();
        let encoded = msg.encode_to_vec().unwrap();
        let mut r = Reassembler::new();

        for &b in &[FRAME_START, 0x01, TYPE_COMMAND, 0x02] {
            assert_eq!(r.feed(b, 0), Ok(None));
        }

        // The START that reveals the stall opens the new frame
        assert_eq!(r.feed(encoded[0], 150), Err(ReassemblyError::Timeout));
        assert!(r.is_filling());
        let (result, rest) = r.feed_bytes(&encoded[1..], 150);
        assert_eq!(result, Ok(Some(msg)));
        assert!(rest.is_empty());
    }

    #[test]
    fn test_timeout_boundary() {
        let mut r = Reassembler::new();
        r.feed(FRAME_START, 1000).unwrap();
        assert_eq!(r.poll(1000 + MAX_MESSAGE_TIMEOUT_MS), Ok(()));
        assert!(r.is_filling());
        assert_eq!(
            r.poll(1000 + MAX_MESSAGE_TIMEOUT_MS + 1),
            Err(ReassemblyError::Timeout)
        );
        assert!(!r.is_filling());
        // Nothing left to expire
        assert_eq!(r.poll(5000), Ok(()));
    }

    #[test]
    fn test_timeout_across_clock_wrap() {
        let mut r = Reassembler::new();
        r.feed(FRAME_START, u32::MAX - 10).unwrap();
        assert_eq!(r.poll(40), Ok(()));
        assert_eq!(r.poll(200), Err(ReassemblyError::Timeout));
    }

    #[test]
    fn test_oversized_length_overflows() {
        let mut r = Reassembler::new();
        for &b in &[FRAME_START, 0x01, TYPE_COMMAND] {
            assert_eq!(r.feed(b, 0), Ok(None));
        }
        assert_eq!(r.feed(200, 0), Err(ReassemblyError::BufferOverflow));
        assert!(!r.is_filling());
    }

    #[test]
    fn test_corrupt_frame_resyncs() {
        let msg = record_start();
        let mut bad = msg.encode_to_vec().unwrap();
        let idx = bad.len() - 2;
        bad[idx] ^= 0x01;

        let mut r = Reassembler::new();
        let (result, _) = r.feed_bytes(&bad, 0);
        assert_eq!(
            result,
            Err(ReassemblyError::Corrupt(FrameError::ChecksumMismatch))
        );
        assert!(!r.is_filling());

        let (result, _) = r.feed_bytes(&msg.encode_to_vec().unwrap(), 0);
        assert_eq!(result, Ok(Some(msg)));
    }

    #[test]
    fn test_wrong_end_byte() {
        let mut bytes = [FRAME_START, 0x02, TYPE_COMMAND, 0x02, 0x02, 0xB0, 0x00, 0x00];
        bytes[6] = checksum(&bytes[1..6]);
        let mut r = Reassembler::new();
        let (result, _) = r.feed_bytes(&bytes, 0);
        assert_eq!(
            result,
            Err(ReassemblyError::Corrupt(FrameError::BadFraming))
        );
    }

    #[test]
    fn test_unknown_opcode_passes_through() {
        let mut bytes = [FRAME_START, 0x02, TYPE_COMMAND, 0x02, 0x99, 0x09, 0x00, FRAME_END];
        bytes[6] = checksum(&bytes[1..6]);
        let mut r = Reassembler::new();
        let (result, _) = r.feed_bytes(&bytes, 0);
        let msg = result.unwrap().unwrap();
        assert_eq!(msg.payload, Payload::Command(0x0999));
    }

    proptest! {
        #[test]
        fn prop_resync_with_surrounding_noise(
            opcode in any::<u16>(),
            before in any::<u8>().prop_filter("not START", |b| *b != FRAME_START),
            after in any::<u8>(),
        ) {
            let msg = Message {
                recipient: Recipient::Firmware,
                payload: Payload::Command(opcode),
            };
            let encoded = msg.encode_to_vec().unwrap();

            let mut alone = Reassembler::new();
            let expected = feed_all(&mut alone, &encoded, 0);

            let mut noisy = heapless::Vec::<u8, 16>::new();
            noisy.push(before).unwrap();
            noisy.extend_from_slice(&encoded).unwrap();
            noisy.push(after).unwrap();

            let mut r = Reassembler::new();
            let got = feed_all(&mut r, &noisy, 0);
            prop_assert_eq!(got.len(), 1);
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn prop_chunking_does_not_matter(
            opcode in any::<u16>(),
            split in 0usize..8,
        ) {
            let msg = Message {
                recipient: Recipient::Linux,
                payload: Payload::Command(opcode),
            };
            let encoded = msg.encode_to_vec().unwrap();

            let mut r = Reassembler::new();
            let mut got = feed_all(&mut r, &encoded[..split], 0);
            got.extend(feed_all(&mut r, &encoded[split..], 1));
            prop_assert_eq!(got.len(), 1);
            prop_assert_eq!(&got[0], &msg);
        }
    }
}
