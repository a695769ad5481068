use std::rc::Rc;
use std::time::Instant;

use crate::clock::{Clock, SystemClock};
use crate::models::{Block, BlockChanges, BlockId};
use crate::options::EditorOptions;

use super::reducer::{ReduceContext, reduce_tracked};
use super::{Action, EditorState};

/// Owner of the authoritative [`EditorState`].
///
/// All changes go through [`BlockStore::dispatch`]; the convenience methods are thin
/// wrappers that build the matching [`Action`].
pub struct BlockStore {
    state: EditorState,
    options: EditorOptions,
    clock: Rc<dyn Clock>,
    /// Incremented on every state change (enables change detection)
    version: u64,
}

impl BlockStore {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self::with_options(blocks, EditorOptions::default(), Rc::new(SystemClock))
    }

    pub fn with_options(blocks: Vec<Block>, options: EditorOptions, clock: Rc<dyn Clock>) -> Self {
        Self {
            state: EditorState::new(blocks),
            options,
            clock,
            version: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn blocks(&self) -> &[Block] {
        &self.state.blocks
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn into_state(self) -> EditorState {
        self.state
    }

    /// Apply one action. Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        let ctx = ReduceContext::new(self.clock.now(), &self.options);
        let (state, changed) = reduce_tracked(std::mem::take(&mut self.state), action, &ctx);
        self.state = state;
        if changed {
            self.version += 1;
        }
        log::debug!("{name}: changed={changed} version={}", self.version);
        changed
    }

    /// Insert a block and return its id.
    pub fn add_block(&mut self, block: Block, index: Option<usize>) -> Option<BlockId> {
        let id = block.id.clone();
        self.dispatch(Action::AddBlock { block, index }).then_some(id)
    }

    pub fn update_block(&mut self, id: &BlockId, changes: BlockChanges) -> bool {
        self.dispatch(Action::UpdateBlock {
            id: id.clone(),
            changes,
        })
    }

    pub fn delete_block(&mut self, id: &BlockId) -> bool {
        self.dispatch(Action::DeleteBlock(id.clone()))
    }

    pub fn move_block(&mut self, id: &BlockId, new_index: usize) -> bool {
        self.dispatch(Action::MoveBlock {
            id: id.clone(),
            new_index,
        })
    }

    /// Duplicate a block and return the copy's id.
    pub fn duplicate_block(&mut self, id: &BlockId) -> Option<BlockId> {
        if !self.dispatch(Action::DuplicateBlock(id.clone())) {
            return None;
        }
        self.state.focused_block_id.clone()
    }

    pub fn select_block(&mut self, id: &BlockId, additive: bool) -> bool {
        self.dispatch(Action::SelectBlock {
            id: id.clone(),
            additive,
        })
    }

    pub fn set_focus(&mut self, id: Option<BlockId>) -> bool {
        self.dispatch(Action::SetFocus(id))
    }

    pub fn undo(&mut self) -> bool {
        self.dispatch(Action::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.dispatch(Action::Redo)
    }

    pub fn can_undo(&self) -> bool {
        self.state.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.history.can_redo()
    }
}

impl std::fmt::Debug for BlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockStore")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
