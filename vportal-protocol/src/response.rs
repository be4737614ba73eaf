//! Reply buffers
//!
//! A reply is 0 to [`MAX_RESPONSE_SIZE`] bytes. An empty reply means nothing
//! is sent back to the host.

use heapless::Vec;

use crate::{Block, Opcode, MAX_RESPONSE_SIZE, SLOT_INDEX_MASK, SLOT_PRESENT_FLAG};

/// A reply to a single request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    bytes: Vec<u8, MAX_RESPONSE_SIZE>,
}

impl Response {
    /// Reply that sends nothing
    pub fn empty() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Build a reply from raw bytes
    ///
    /// Bytes past [`MAX_RESPONSE_SIZE`] are dropped.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_RESPONSE_SIZE);
        let mut vec = Vec::new();
        // Cannot fail, length is clamped to capacity
        let _ = vec.extend_from_slice(&bytes[..len]);
        Self { bytes: vec }
    }

    /// `A` acknowledgement
    pub fn activate(raw: u8) -> Self {
        Self::from_slice(&[Opcode::Activate.as_u8(), raw, 0xFF, 0x77])
    }

    /// `M` acknowledgement
    pub fn speaker(raw: u8) -> Self {
        Self::from_slice(&[Opcode::Speaker.as_u8(), raw, 0x00, 0x19])
    }

    /// `R` acknowledgement
    pub fn reset() -> Self {
        Self::from_slice(&[Opcode::Reset.as_u8(), 0x02, 0x1B])
    }

    /// Acknowledgement for both light commands (`J` and `L`)
    pub fn light() -> Self {
        Self::from_slice(&[Opcode::ZoneLight.as_u8()])
    }

    /// `Q` reply carrying block data
    pub fn query(slot: u8, block: u8, data: &Block) -> Self {
        let mut response = Self::from_slice(&[
            Opcode::Query.as_u8(),
            SLOT_PRESENT_FLAG | (slot & SLOT_INDEX_MASK),
            block,
        ]);
        // 3 + 16 bytes fits the reply buffer
        let _ = response.bytes.extend_from_slice(data);
        response
    }

    /// `W` acknowledgement for a stored block
    pub fn write(slot: u8, block: u8) -> Self {
        Self::from_slice(&[
            Opcode::Write.as_u8(),
            SLOT_PRESENT_FLAG | (slot & SLOT_INDEX_MASK),
            block,
        ])
    }

    /// Negative acknowledgement for `Q`/`W` against a slot with no token
    pub fn slot_empty(opcode: Opcode, slot: u8, block: u8) -> Self {
        Self::from_slice(&[opcode.as_u8(), slot & SLOT_INDEX_MASK, block])
    }

    /// Reply bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of reply bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing should be sent
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reply as a full zero-padded frame
    pub fn to_frame(&self) -> [u8; MAX_RESPONSE_SIZE] {
        let mut frame = [0u8; MAX_RESPONSE_SIZE];
        frame[..self.bytes.len()].copy_from_slice(&self.bytes);
        frame
    }
}
