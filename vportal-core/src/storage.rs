//! Block storage proxy
//!
//! Serves `Q` and `W` requests against the tags of loaded tokens. A slot
//! without a loaded token gets a short negative reply with the presence
//! flag clear; nothing is read or written.

use vportal_protocol::{Opcode, RequestError, Response};

use crate::slots::SlotTable;
use crate::token::TokenSlot;
use crate::traits::TagStorage;
use crate::Block;

fn loaded_slot<T>(slots: &SlotTable<T>, slot: u8) -> Option<&TokenSlot<T>> {
    slots.get(slot as usize).filter(|s| s.loaded)
}

fn out_of_range(slot: u8, block: u8, count: usize) -> RequestError {
    RequestError::BlockOutOfRange { slot, block, count }
}

/// Read one block of a slot's tag
pub fn query<T: TagStorage>(
    slots: &SlotTable<T>,
    slot: u8,
    block: u8,
) -> Result<Response, RequestError> {
    let Some(entry) = loaded_slot(slots, slot) else {
        return Ok(Response::slot_empty(Opcode::Query, slot, block));
    };

    let tag = entry.tag();
    let data = tag
        .read_block(block as usize)
        .ok_or_else(|| out_of_range(slot, block, tag.block_count()))?;

    Ok(Response::query(slot, block, &data))
}

/// Replace one block of a slot's tag
///
/// The whole block table is fetched, patched, and stored back.
pub fn write<T: TagStorage>(
    slots: &mut SlotTable<T>,
    slot: u8,
    block: u8,
    data: &Block,
) -> Result<Response, RequestError> {
    let entry = match slots.get_mut(slot as usize) {
        Some(entry) if entry.loaded => entry,
        _ => return Ok(Response::slot_empty(Opcode::Write, slot, block)),
    };

    let tag = entry.tag_mut();
    let mut blocks = tag.get_blocks();
    let count = blocks.as_ref().len();
    let target = blocks
        .as_mut()
        .get_mut(block as usize)
        .ok_or_else(|| out_of_range(slot, block, count))?;
    *target = *data;
    tag.set_blocks(blocks);

    Ok(Response::write(slot, block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{ClassicTag, CLASSIC_1K_BLOCKS};
    use crate::token::{Label, TokenDescriptor, Uid};

    fn table_with_token(slot_count: usize) -> SlotTable<ClassicTag> {
        let mut table = SlotTable::new();
        for i in 0..slot_count {
            let mut image = ClassicTag::blank(CLASSIC_1K_BLOCKS);
            let mut blocks = image.get_blocks();
            blocks[1] = [i as u8 + 1; 16];
            image.set_blocks(blocks);
            table
                .load(TokenDescriptor::placed(
                    Uid([i as u8 + 1, 0, 0, 0]),
                    Label::new(),
                    image,
                ))
                .unwrap();
        }
        table
    }

    #[test]
    fn test_query_unloaded_slot() {
        let table = table_with_token(0);
        let response = query(&table, 2, 7).unwrap();
        assert_eq!(response.as_bytes(), &[b'Q', 0x02, 7]);
    }

    #[test]
    fn test_query_loaded_slot() {
        let table = table_with_token(2);
        let response = query(&table, 1, 1).unwrap();
        assert_eq!(response.len(), 19);
        assert_eq!(&response.as_bytes()[..3], &[b'Q', 0x11, 1]);
        assert_eq!(&response.as_bytes()[3..], &[2u8; 16]);
    }

    #[test]
    fn test_slot_beyond_table_is_unloaded() {
        let table = table_with_token(1);
        let response = query(&table, 0x0F, 0).unwrap();
        assert_eq!(response.as_bytes(), &[b'Q', 0x0F, 0]);
    }

    #[test]
    fn test_write_unloaded_slot_changes_nothing() {
        let mut table = table_with_token(1);
        table.unload(0).unwrap();
        let before = table.get(0).unwrap().tag().clone();

        let response = write(&mut table, 0, 1, &[0xEE; 16]).unwrap();

        assert_eq!(response.as_bytes(), &[b'W', 0x00, 1]);
        assert_eq!(table.get(0).unwrap().tag(), &before);
    }

    #[test]
    fn test_write_then_query_roundtrip() {
        let mut table = table_with_token(1);
        let data: Block = core::array::from_fn(|i| i as u8 * 3);

        let ack = write(&mut table, 0, 5, &data).unwrap();
        assert_eq!(ack.as_bytes(), &[b'W', 0x10, 5]);

        let response = query(&table, 0, 5).unwrap();
        assert_eq!(response.as_bytes()[1] & 0xF0, 0x10);
        assert_eq!(&response.as_bytes()[3..], &data);
        // Neighbouring blocks untouched
        assert_eq!(table.get(0).unwrap().tag().read_block(1), Some([1u8; 16]));
    }

    #[test]
    fn test_block_out_of_range() {
        let mut table = table_with_token(1);
        let count = CLASSIC_1K_BLOCKS;
        assert_eq!(
            query(&table, 0, 64),
            Err(RequestError::BlockOutOfRange {
                slot: 0,
                block: 64,
                count
            })
        );
        assert_eq!(
            write(&mut table, 0, 200, &[0; 16]),
            Err(RequestError::BlockOutOfRange {
                slot: 0,
                block: 200,
                count
            })
        );
    }
}
