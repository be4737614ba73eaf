//! In-memory tag images
//!
//! A [`MemoryTag`] holds a dumped tag as a bounded block table. It is the
//! storage used for tokens loaded from saved images.

use heapless::Vec;

use crate::traits::TagStorage;
use crate::Block;

/// Blocks on a MIFARE Classic 1K tag (16 sectors × 4 blocks)
pub const CLASSIC_1K_BLOCKS: usize = 64;

/// Tag image held in RAM
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryTag<const N: usize> {
    blocks: Vec<Block, N>,
}

/// Image of a MIFARE Classic 1K tag
pub type ClassicTag = MemoryTag<CLASSIC_1K_BLOCKS>;

impl<const N: usize> MemoryTag<N> {
    /// Create a tag with no blocks
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Create a tag with `count` zeroed blocks
    ///
    /// `count` is clamped to the tag capacity.
    pub fn blank(count: usize) -> Self {
        let mut blocks = Vec::new();
        for _ in 0..count.min(N) {
            // Bounded by N above
            let _ = blocks.push([0u8; 16]);
        }
        Self { blocks }
    }

    /// Create a tag from a raw image
    ///
    /// Returns `None` if the image holds more than `N` blocks.
    pub fn from_blocks(image: &[Block]) -> Option<Self> {
        let mut blocks = Vec::new();
        blocks.extend_from_slice(image).ok()?;
        Some(Self { blocks })
    }

    /// Borrow the block table without copying
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

impl<const N: usize> TagStorage for MemoryTag<N> {
    type Blocks = Vec<Block, N>;

    fn get_blocks(&self) -> Self::Blocks {
        self.blocks.clone()
    }

    fn set_blocks(&mut self, blocks: Self::Blocks) {
        self.blocks = blocks;
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn read_block(&self, index: usize) -> Option<Block> {
        self.blocks.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_clamped() {
        let tag = MemoryTag::<4>::blank(10);
        assert_eq!(tag.block_count(), 4);
        assert_eq!(tag.read_block(3), Some([0u8; 16]));
        assert_eq!(tag.read_block(4), None);
    }

    #[test]
    fn test_from_blocks_rejects_oversized_image() {
        let image = [[1u8; 16]; 5];
        assert!(MemoryTag::<4>::from_blocks(&image).is_none());
        let tag = MemoryTag::<8>::from_blocks(&image).unwrap();
        assert_eq!(tag.blocks(), &image[..]);
    }

    #[test]
    fn test_set_blocks_replaces_table() {
        let mut tag = ClassicTag::blank(CLASSIC_1K_BLOCKS);
        let mut blocks = tag.get_blocks();
        blocks[5] = [0x55; 16];
        // Copy is detached until stored back
        assert_eq!(tag.read_block(5), Some([0u8; 16]));
        tag.set_blocks(blocks);
        assert_eq!(tag.read_block(5), Some([0x55; 16]));
    }
}
