//! Status report layout
//!
//! ```text
//! ┌─────┬────────────────────┬──────────┬───────┐
//! │ 'S' │ SLOT BITS          │ SEQUENCE │ 0x01  │
//! │ 1B  │ 4B (2 bits / slot) │ 1B       │ 1B    │
//! └─────┴────────────────────┴──────────┴───────┘
//! ```
//!
//! Slot `i` occupies bits `(i % 4) * 2` (loaded) and `(i % 4) * 2 + 1`
//! (changed) of byte `1 + i / 4`.

use crate::{Opcode, Response};

/// Number of slots the report layout can address
pub const MAX_REPORTED_SLOTS: usize = 16;

/// Length of an encoded status report
pub const STATUS_LEN: usize = 7;

const LOADED_BIT: u8 = 0;
const CHANGED_BIT: u8 = 1;

/// Status report for all slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    bits: [u8; 4],
    sequence: u8,
}

impl StatusReport {
    /// Create a report with no slot bits set
    pub fn new(sequence: u8) -> Self {
        Self {
            bits: [0; 4],
            sequence,
        }
    }

    /// Record one slot's flags
    ///
    /// Slots beyond [`MAX_REPORTED_SLOTS`] are ignored.
    pub fn set_slot(&mut self, slot: usize, loaded: bool, changed: bool) {
        if slot >= MAX_REPORTED_SLOTS {
            return;
        }
        let shift = (slot % 4) as u8 * 2;
        let byte = &mut self.bits[slot / 4];
        if loaded {
            *byte |= 1 << (shift + LOADED_BIT);
        }
        if changed {
            *byte |= 1 << (shift + CHANGED_BIT);
        }
    }

    fn bit(&self, slot: usize, bit: u8) -> bool {
        if slot >= MAX_REPORTED_SLOTS {
            return false;
        }
        let shift = (slot % 4) as u8 * 2 + bit;
        self.bits[slot / 4] & (1 << shift) != 0
    }

    /// Whether the slot holds a token
    pub fn is_loaded(&self, slot: usize) -> bool {
        self.bit(slot, LOADED_BIT)
    }

    /// Whether the slot changed since the previous report
    pub fn is_changed(&self, slot: usize) -> bool {
        self.bit(slot, CHANGED_BIT)
    }

    /// Whether any slot changed since the previous report
    pub fn any_changed(&self) -> bool {
        self.bits.iter().any(|&b| b & 0b1010_1010 != 0)
    }

    /// Sequence number carried by this report
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Encode as reply bytes
    pub fn encode(&self) -> [u8; STATUS_LEN] {
        let mut out = [0u8; STATUS_LEN];
        out[0] = Opcode::Status.as_u8();
        out[1..5].copy_from_slice(&self.bits);
        out[5] = self.sequence;
        out[6] = 1;
        out
    }

    /// Encode as a [`Response`]
    pub fn to_response(&self) -> Response {
        Response::from_slice(&self.encode())
    }

    /// Decode reply bytes
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < STATUS_LEN || bytes[0] != Opcode::Status.as_u8() {
            return None;
        }
        let mut bits = [0u8; 4];
        bits.copy_from_slice(&bytes[1..5]);
        Some(Self {
            bits,
            sequence: bytes[5],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slot_zero_loaded_and_changed() {
        let mut report = StatusReport::new(0);
        report.set_slot(0, true, true);
        let bytes = report.encode();
        assert_eq!(bytes[0], b'S');
        assert_eq!(bytes[1], 0x03);
        assert_eq!(&bytes[2..5], &[0, 0, 0]);
        assert_eq!(bytes[6], 1);
    }

    #[test]
    fn test_slot_packing() {
        let mut report = StatusReport::new(9);
        report.set_slot(3, true, false); // byte 1, bit 6
        report.set_slot(4, false, true); // byte 2, bit 1
        report.set_slot(6, true, true); // byte 2, bits 4-5
        let bytes = report.encode();
        assert_eq!(bytes[1], 0b0100_0000);
        assert_eq!(bytes[2], 0b0011_0010);
        assert_eq!(bytes[5], 9);
    }

    #[test]
    fn test_parse_rejects_other_replies() {
        assert_eq!(StatusReport::parse(&[b'Q', 0, 0, 0, 0, 0, 1]), None);
        assert_eq!(StatusReport::parse(&[b'S', 0]), None);
    }

    #[test]
    fn test_any_changed_ignores_loaded_bits() {
        let mut report = StatusReport::new(0);
        for slot in 0..7 {
            report.set_slot(slot, true, false);
        }
        assert!(!report.any_changed());
        report.set_slot(5, true, true);
        assert!(report.any_changed());
    }

    proptest! {
        #[test]
        fn prop_slot_flags_survive_encoding(
            flags in proptest::collection::vec((any::<bool>(), any::<bool>()), MAX_REPORTED_SLOTS),
            sequence in 0u8..=254,
        ) {
            let mut report = StatusReport::new(sequence);
            for (slot, &(loaded, changed)) in flags.iter().enumerate() {
                report.set_slot(slot, loaded, changed);
            }
            let parsed = StatusReport::parse(&report.encode()).unwrap();
            for (slot, &(loaded, changed)) in flags.iter().enumerate() {
                prop_assert_eq!(parsed.is_loaded(slot), loaded);
                prop_assert_eq!(parsed.is_changed(slot), changed);
            }
            prop_assert_eq!(parsed.sequence(), sequence);
            prop_assert_eq!(parsed.any_changed(), flags.iter().any(|f| f.1));
        }
    }
}
