//! Tag storage trait

use crate::Block;

/// Block storage of a token's tag
///
/// The portal treats the tag as an opaque table of 16-byte blocks. Writes go
/// through a copy-modify-store cycle: fetch the whole table, change one
/// block, store the whole table back.
pub trait TagStorage {
    /// Owned copy of the block table
    type Blocks: AsRef<[Block]> + AsMut<[Block]>;

    /// Fetch a copy of every block on the tag
    fn get_blocks(&self) -> Self::Blocks;

    /// Replace every block on the tag
    fn set_blocks(&mut self, blocks: Self::Blocks);

    /// Number of blocks on the tag
    fn block_count(&self) -> usize {
        self.get_blocks().as_ref().len()
    }

    /// Read a single block
    fn read_block(&self, index: usize) -> Option<Block> {
        self.get_blocks().as_ref().get(index).copied()
    }
}
