//! Board-agnostic protocol engine for the portal firmware
//!
//! This crate contains all portal logic that does not depend on
//! specific hardware implementations:
//!
//! - Token slot table and placement policy
//! - Status encoding with the rolling sequence counter
//! - Block storage proxy for token tags
//! - Lighting zones and the LED fade state machine
//! - The command dispatcher ([`Portal`])
//! - Configuration type definitions

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod fader;
pub mod lighting;
pub mod portal;
pub mod slots;
pub mod status;
pub mod storage;
pub mod tag;
pub mod token;
pub mod traits;

pub use portal::Portal;
pub use vportal_protocol::{Block, Response, RequestError, Rgb, BLOCK_SIZE, FRAME_SIZE};

/// Number of token slots on the portal
pub const TOKEN_LIMIT: usize = 7;
