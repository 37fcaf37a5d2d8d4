//! OAC device <-> host link protocol
//!
//! This crate defines the binary protocol spoken over the single UART
//! between the camera's power-management MCU and its Linux host. The link
//! is half-duplex and lossy, so every message is framed and checksummed and
//! the receiver resynchronizes on its own after any corruption.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────┬───────────┬──────┬────────┬─────────────┬──────────┬──────┐
//! │ START │ RECIPIENT │ TYPE │ LENGTH │ PAYLOAD     │ CHECKSUM │ END  │
//! │ 0xAA  │ 1B        │ 1B   │ 1B     │ 0–128B      │ XOR 1B   │ 0x55 │
//! └───────┴───────────┴──────┴────────┴─────────────┴──────────┴──────┘
//! ```
//!
//! - [`frame`] encodes and decodes single frames
//! - [`message`] gives the payload a type
//! - [`reassembler`] turns a byte stream into messages
//! - [`commands`] lists the COMMAND opcodes

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod commands;
pub mod frame;
pub mod message;
pub mod reassembler;

pub use commands::Command;
pub use frame::{Frame, FrameError, FRAME_END, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use message::{ErrorBody, Message, MessageType, Payload, Recipient, ResponseBody, StatusBody};
pub use reassembler::{Reassembler, ReassemblyError, MAX_MESSAGE_TIMEOUT_MS};
