//! Typed messages carried inside frames
//!
//! Payload layouts (little-endian):
//! - COMMAND: `[opcode: u16]`
//! - STATUS: `[battery_uv: u32][state: u8][charging: u8][error_code: u8]`
//! - ERROR: `[code: u8][text: 0..=127 bytes]`
//! - DATA: raw bytes
//! - RESPONSE: `[param: u16][value: u64]`

use crate::commands::Command;
use crate::frame::{
    Frame, FrameError, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, TYPE_COMMAND, TYPE_DATA, TYPE_ERROR,
    TYPE_RESPONSE, TYPE_STATUS,
};
use heapless::{String, Vec};

/// Maximum length of the text carried by an ERROR message
pub const MAX_ERROR_TEXT: usize = MAX_PAYLOAD_SIZE - 1;

const COMMAND_LEN: usize = 2;
const STATUS_LEN: usize = 7;
const RESPONSE_LEN: usize = 10;

/// Intended consumer of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Recipient {
    /// The Linux camera host
    Linux,
    /// The device MCU firmware
    Firmware,
}

impl Recipient {
    /// Parse from wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Recipient::Linux),
            0x02 => Some(Recipient::Firmware),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            Recipient::Linux => 0x01,
            Recipient::Firmware => 0x02,
        }
    }
}

/// Message type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    Command,
    Status,
    Error,
    Data,
    Response,
}

impl MessageType {
    /// Parse from wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            TYPE_COMMAND => Some(MessageType::Command),
            TYPE_STATUS => Some(MessageType::Status),
            TYPE_ERROR => Some(MessageType::Error),
            TYPE_DATA => Some(MessageType::Data),
            TYPE_RESPONSE => Some(MessageType::Response),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            MessageType::Command => TYPE_COMMAND,
            MessageType::Status => TYPE_STATUS,
            MessageType::Error => TYPE_ERROR,
            MessageType::Data => TYPE_DATA,
            MessageType::Response => TYPE_RESPONSE,
        }
    }
}

/// Periodic device status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusBody {
    /// Battery voltage in microvolts
    pub battery_uv: u32,
    /// Device lifecycle state code
    pub state: u8,
    /// Charger is active
    pub charging: bool,
    /// Active error code, 0 if none
    pub error_code: u8,
}

/// Error report with a human-readable message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorBody {
    pub code: u8,
    pub text: String<MAX_ERROR_TEXT>,
}

/// Parameter get/set reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseBody {
    /// Parameter id (a command opcode, e.g. WD_SET_TIMEOUT)
    pub param: u16,
    pub value: u64,
}

/// Type-specific message content
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Payload {
    /// Raw opcode; see [`Command`] for the known values
    Command(u16),
    Status(StatusBody),
    Error(ErrorBody),
    Data(Vec<u8, MAX_PAYLOAD_SIZE>),
    Response(ResponseBody),
}

/// A single protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    pub recipient: Recipient,
    pub payload: Payload,
}

impl Message {
    /// COMMAND with a known opcode
    pub fn command(recipient: Recipient, command: Command) -> Self {
        Self {
            recipient,
            payload: Payload::Command(command.to_u16()),
        }
    }

    /// STATUS report
    pub fn status(recipient: Recipient, status: StatusBody) -> Self {
        Self {
            recipient,
            payload: Payload::Status(status),
        }
    }

    /// ERROR report
    ///
    /// `text` ends at its first NUL, which terminates it on the wire, and is
    /// cut to [`MAX_ERROR_TEXT`] bytes on a char boundary.
    pub fn error(recipient: Recipient, code: u8, text: &str) -> Self {
        let text = text.find('\0').map_or(text, |end| &text[..end]);
        let mut body = String::new();
        // Cannot fail: the slice fits by construction
        let _ = body.push_str(truncate_utf8(text, MAX_ERROR_TEXT));
        Self {
            recipient,
            payload: Payload::Error(ErrorBody { code, text: body }),
        }
    }

    /// RESPONSE carrying a parameter value
    pub fn response(recipient: Recipient, param: u16, value: u64) -> Self {
        Self {
            recipient,
            payload: Payload::Response(ResponseBody { param, value }),
        }
    }

    /// DATA with raw bytes
    pub fn data(recipient: Recipient, bytes: &[u8]) -> Result<Self, FrameError> {
        let data = Vec::from_slice(bytes).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self {
            recipient,
            payload: Payload::Data(data),
        })
    }

    /// Type of this message
    pub fn msg_type(&self) -> MessageType {
        match self.payload {
            Payload::Command(_) => MessageType::Command,
            Payload::Status(_) => MessageType::Status,
            Payload::Error(_) => MessageType::Error,
            Payload::Data(_) => MessageType::Data,
            Payload::Response(_) => MessageType::Response,
        }
    }

    /// Known command carried by this message, if any
    pub fn as_command(&self) -> Option<Command> {
        match self.payload {
            Payload::Command(opcode) => Command::from_u16(opcode),
            _ => None,
        }
    }

    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let recipient = self.recipient.to_byte();
        let msg_type = self.msg_type().to_byte();

        match &self.payload {
            Payload::Command(opcode) => Frame::new(recipient, msg_type, &opcode.to_le_bytes()),
            Payload::Status(status) => {
                let mut payload = [0u8; STATUS_LEN];
                payload[..4].copy_from_slice(&status.battery_uv.to_le_bytes());
                payload[4] = status.state;
                payload[5] = status.charging as u8;
                payload[6] = status.error_code;
                Frame::new(recipient, msg_type, &payload)
            }
            Payload::Error(error) => {
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload
                    .push(error.code)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(error.text.as_bytes())
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(recipient, msg_type, &payload)
            }
            Payload::Data(data) => Frame::new(recipient, msg_type, data),
            Payload::Response(response) => {
                let mut payload = [0u8; RESPONSE_LEN];
                payload[..2].copy_from_slice(&response.param.to_le_bytes());
                payload[2..].copy_from_slice(&response.value.to_le_bytes());
                Frame::new(recipient, msg_type, &payload)
            }
        }
    }

    /// Parse a message from a decoded frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let recipient = Recipient::from_byte(frame.recipient).ok_or(FrameError::UnknownRecipient)?;
        let msg_type = MessageType::from_byte(frame.msg_type).ok_or(FrameError::UnknownType)?;
        let p = frame.payload.as_slice();

        let payload = match msg_type {
            MessageType::Command => {
                if p.len() != COMMAND_LEN {
                    return Err(FrameError::InvalidPayload);
                }
                Payload::Command(u16::from_le_bytes([p[0], p[1]]))
            }
            MessageType::Status => {
                if p.len() != STATUS_LEN {
                    return Err(FrameError::InvalidPayload);
                }
                Payload::Status(StatusBody {
                    battery_uv: u32::from_le_bytes([p[0], p[1], p[2], p[3]]),
                    state: p[4],
                    charging: p[5] != 0,
                    error_code: p[6],
                })
            }
            MessageType::Error => {
                let (&code, text) = p.split_first().ok_or(FrameError::InvalidPayload)?;
                // Text is NUL-terminated when the sender uses a fixed buffer
                let text = match text.iter().position(|&b| b == 0) {
                    Some(end) => &text[..end],
                    None => text,
                };
                let text = match core::str::from_utf8(text) {
                    Ok(s) => s,
                    Err(e) => core::str::from_utf8(&text[..e.valid_up_to()])
                        .map_err(|_| FrameError::InvalidPayload)?,
                };
                let mut body = String::new();
                body.push_str(text).map_err(|_| FrameError::PayloadTooLarge)?;
                Payload::Error(ErrorBody { code, text: body })
            }
            MessageType::Data => Payload::Data(frame.payload.clone()),
            MessageType::Response => {
                if p.len() != RESPONSE_LEN {
                    return Err(FrameError::InvalidPayload);
                }
                let mut value = [0u8; 8];
                value.copy_from_slice(&p[2..]);
                Payload::Response(ResponseBody {
                    param: u16::from_le_bytes([p[0], p[1]]),
                    value: u64::from_le_bytes(value),
                })
            }
        };

        Ok(Self { recipient, payload })
    }

    /// Encode into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        self.to_frame()?.encode(buffer)
    }

    /// Encode into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        self.to_frame()?.encode_to_vec()
    }

    /// Decode one complete frame into a message
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        Self::from_frame(&Frame::decode(bytes)?)
    }
}

fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
