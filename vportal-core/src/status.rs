//! Status encoding
//!
//! Produces the `S` report from the slot table. Reading a report consumes
//! the change flags, so each change is reported exactly once.

use vportal_protocol::StatusReport;

use crate::slots::SlotTable;

/// Largest sequence number ever emitted
pub const MAX_SEQUENCE: u8 = 254;

/// Rolling status sequence counter
///
/// Emits `0, 1, ..., 254, 0, ...`; the value 255 never appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequenceCounter {
    next: u8,
}

impl SequenceCounter {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Return the current value and advance
    pub fn advance(&mut self) -> u8 {
        let value = self.next;
        self.next = if value >= MAX_SEQUENCE { 0 } else { value + 1 };
        value
    }

    /// Value the next call to [`advance`](Self::advance) returns
    pub fn peek(&self) -> u8 {
        self.next
    }
}

/// Build a status report and clear every change flag
pub fn encode_status<T>(slots: &mut SlotTable<T>, counter: &mut SequenceCounter) -> StatusReport {
    let mut report = StatusReport::new(counter.advance());
    for (index, slot) in slots.iter_mut().enumerate() {
        report.set_slot(index, slot.loaded, slot.changed);
        slot.changed = false;
    }
    report
}
