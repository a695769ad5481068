use std::collections::HashSet;

use indexmap::IndexSet;

use crate::error::EditorError;
use crate::models::{Block, BlockId};

use super::history::History;

/// Everything the editor knows about one open document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub blocks: Vec<Block>,
    pub focused_block_id: Option<BlockId>,
    /// Selection in the order blocks were selected.
    pub selected_block_ids: IndexSet<BlockId>,
    pub errors: Vec<EditorError>,
    pub history: History,
}

impl EditorState {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks: with_unique_ids(blocks),
            ..Self::default()
        }
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == *id)
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == *id)
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_block_id.as_ref().and_then(|id| self.index_of(id))
    }

    pub fn focused_block(&self) -> Option<&Block> {
        self.focused_index().map(|index| &self.blocks[index])
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.selected_block_ids.contains(id)
    }

    /// Drop focus and selection entries whose block is gone.
    pub(crate) fn prune_references(&mut self) {
        let ids: HashSet<&BlockId> = self.blocks.iter().map(|block| &block.id).collect();
        if self
            .focused_block_id
            .as_ref()
            .is_some_and(|id| !ids.contains(id))
        {
            self.focused_block_id = None;
        }
        self.selected_block_ids.retain(|id| ids.contains(id));
    }
}

/// Give every block after the first with an already used id a fresh one.
pub(crate) fn with_unique_ids(mut blocks: Vec<Block>) -> Vec<Block> {
    let mut seen = HashSet::new();
    for block in &mut blocks {
        if !seen.insert(block.id.clone()) {
            let fresh = BlockId::generate();
            log::warn!("duplicate block id {} replaced with {fresh}", block.id);
            block.id = fresh.clone();
            seen.insert(fresh);
        }
    }
    blocks
}
