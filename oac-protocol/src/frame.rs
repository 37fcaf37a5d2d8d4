//! Frame encoding and decoding for the device <-> host link.
//!
//! Frame format:
//! - START (1 byte): 0xAA synchronization byte
//! - RECIPIENT (1 byte): 0x01 host, 0x02 device firmware
//! - TYPE (1 byte): message type identifier
//! - LENGTH (1 byte): payload length N (0-128)
//! - PAYLOAD (N bytes): type-specific data, little-endian
//! - CHECKSUM (1 byte): XOR of RECIPIENT, TYPE, LENGTH and all PAYLOAD bytes
//! - END (1 byte): 0x55

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Frame terminator byte
pub const FRAME_END: u8 = 0x55;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 128;

/// Bytes added around the payload (START, RECIPIENT, TYPE, LENGTH, CHECKSUM, END)
pub const FRAME_OVERHEAD: usize = 6;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

/// Offset of the LENGTH byte
pub(crate) const LENGTH_INDEX: usize = 3;

/// Offset of the first payload byte
const PAYLOAD_INDEX: usize = 4;

/// Message type identifiers accepted on the wire
pub const TYPE_COMMAND: u8 = 0x01;
pub const TYPE_STATUS: u8 = 0x02;
pub const TYPE_ERROR: u8 = 0x03;
pub const TYPE_DATA: u8 = 0x04;
pub const TYPE_RESPONSE: u8 = 0x06;

/// Errors that can occur during frame encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Type byte is not one the encoder knows how to send
    UnsupportedType,
    /// Fewer than [`FRAME_OVERHEAD`] bytes
    FrameTooShort,
    /// First or last byte is not START/END
    BadFraming,
    /// Transmitted checksum does not match the computed one
    ChecksumMismatch,
    /// LENGTH byte disagrees with the number of bytes in the frame
    LengthMismatch,
    /// Type byte is not one of the known message types
    UnknownType,
    /// Recipient byte is neither host nor firmware
    UnknownRecipient,
    /// Payload length or content does not fit the message type
    InvalidPayload,
    /// Output buffer too small for the encoded frame
    BufferTooSmall,
}

/// Returns true if `msg_type` is one of the known message types
pub fn is_known_type(msg_type: u8) -> bool {
    matches!(
        msg_type,
        TYPE_COMMAND | TYPE_STATUS | TYPE_ERROR | TYPE_DATA | TYPE_RESPONSE
    )
}

/// XOR checksum over header and payload bytes
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

/// A frame with validated framing but an uninterpreted payload
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Recipient byte
    pub recipient: u8,
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given header bytes and payload
    pub fn new(recipient: u8, msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            recipient,
            msg_type,
            payload: payload_vec,
        })
    }

    /// Total encoded length of this frame
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if !is_known_type(self.msg_type) {
            return Err(FrameError::UnsupportedType);
        }

        let n = self.payload.len();
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = FRAME_START;
        buffer[1] = self.recipient;
        buffer[2] = self.msg_type;
        buffer[LENGTH_INDEX] = n as u8;
        buffer[PAYLOAD_INDEX..PAYLOAD_INDEX + n].copy_from_slice(&self.payload);
        buffer[PAYLOAD_INDEX + n] = checksum(&buffer[1..PAYLOAD_INDEX + n]);
        buffer[PAYLOAD_INDEX + n + 1] = FRAME_END;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode one complete frame
    ///
    /// The checksum is verified against the bytes actually received before
    /// the LENGTH byte is trusted, so a corrupted length is reported as a
    /// checksum failure rather than a length failure.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < FRAME_OVERHEAD {
            return Err(FrameError::FrameTooShort);
        }

        let last = bytes.len() - 1;
        if bytes[0] != FRAME_START || bytes[last] != FRAME_END {
            return Err(FrameError::BadFraming);
        }

        let checksum_index = last - 1;
        if checksum(&bytes[1..checksum_index]) != bytes[checksum_index] {
            return Err(FrameError::ChecksumMismatch);
        }

        let n = bytes[LENGTH_INDEX] as usize;
        if bytes.len() != FRAME_OVERHEAD + n {
            return Err(FrameError::LengthMismatch);
        }

        let msg_type = bytes[2];
        if !is_known_type(msg_type) {
            return Err(FrameError::UnknownType);
        }

        Self::new(bytes[1], msg_type, &bytes[PAYLOAD_INDEX..PAYLOAD_INDEX + n])
    }
}
