//! Portal command protocol
//!
//! This crate defines the byte protocol spoken between a host game console
//! and the portal. The host sends fixed-size request frames; the portal
//! answers with a reply of 0 to 32 bytes (0 meaning "no reply is sent").
//!
//! # Protocol Overview
//!
//! ```text
//! ┌────────┬──────────────────────────────────────────┐
//! │ OPCODE │ ARGUMENTS (opcode specific, zero padded) │
//! │ 1B     │ 31B                                      │
//! └────────┴──────────────────────────────────────────┘
//! ```
//!
//! Multi-byte numeric fields are little-endian. How frames travel between
//! host and portal is outside this crate.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod response;
pub mod status;

pub use command::{Command, LegacyLight, Opcode, RequestError, Rgb, ZoneSelector};
pub use response::Response;
pub use status::StatusReport;

/// Size of a request frame in bytes
pub const FRAME_SIZE: usize = 32;

/// Maximum size of a reply in bytes
pub const MAX_RESPONSE_SIZE: usize = 32;

/// Size of one tag data block in bytes
pub const BLOCK_SIZE: usize = 16;

/// One tag data block
pub type Block = [u8; BLOCK_SIZE];

/// Mask selecting the slot index from a slot address byte
pub const SLOT_INDEX_MASK: u8 = 0x0F;

/// Flag set in a slot address byte when the addressed slot holds a token
pub const SLOT_PRESENT_FLAG: u8 = 0x10;
