//! Append-only block list for one chain.
//!
//! Heights start at [`GENESIS_HEIGHT`] and have no gaps, so the block at
//! height `h` lives at index `h - GENESIS_HEIGHT`.

use sc_01_chain_mux::ChainError;
use shared_types::{Block, GENESIS_HEIGHT};

#[derive(Debug, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Height of the head block, 0 when empty.
    pub fn height(&self) -> u64 {
        self.head().map(Block::height).unwrap_or(0)
    }

    pub fn head(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn get(&self, height: u64) -> Option<&Block> {
        let index = height.checked_sub(GENESIS_HEIGHT)?;
        self.blocks.get(usize::try_from(index).ok()?)
    }

    /// Check that `block` extends the current head.
    pub fn check_extends(&self, block: &Block) -> Result<(), ChainError> {
        let height = block.height();

        let Some(head) = self.head() else {
            if height != GENESIS_HEIGHT {
                return Err(ChainError::HeightMismatch {
                    expected: GENESIS_HEIGHT,
                    got: height,
                });
            }
            if block.header.parent.is_some() {
                return Err(ChainError::GenesisHasParent);
            }
            return Ok(());
        };

        if let Some(stored) = self.get(height) {
            if stored.hash() == block.hash() {
                return Err(ChainError::DuplicateBlock { height });
            }
        }

        let expected = head.height() + 1;
        if height != expected {
            return Err(ChainError::HeightMismatch {
                expected,
                got: height,
            });
        }

        match &block.header.parent {
            None => Err(ChainError::MissingParent { height }),
            Some(parent) if *parent != head.block_ref() => {
                Err(ChainError::ParentMismatch { height })
            }
            Some(_) => Ok(()),
        }
    }

    /// Append after a successful [`check_extends`](Self::check_extends).
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        self.check_extends(&block)?;
        self.blocks.push(block);
        Ok(())
    }

    /// Up to `count` blocks from the head downwards.
    pub fn latest(&self, count: usize) -> Vec<Block> {
        self.blocks.iter().rev().take(count).cloned().collect()
    }

    /// Blocks with heights in `[start, end]`, ascending.
    ///
    /// `None` if any height in the range is not stored.
    pub fn range(&self, start: u64, end: u64) -> Option<&[Block]> {
        if start < GENESIS_HEIGHT || start > end || end > self.height() {
            return None;
        }
        let from = usize::try_from(start - GENESIS_HEIGHT).ok()?;
        let to = usize::try_from(end - GENESIS_HEIGHT).ok()?;
        self.blocks.get(from..=to)
    }
}
