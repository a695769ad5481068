//! The pure state transition function behind [`BlockStore`](super::BlockStore).
//!
//! `reduce` takes the current state by value and hands back the next one. Actions
//! that reference a block id which is not in the sequence return the state untouched.

use std::time::{Duration, Instant};

use crate::models::Block;
use crate::options::EditorOptions;

use super::state::with_unique_ids;
use super::{Action, EditorState};

/// Inputs of a transition that do not live in the state itself.
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext {
    pub now: Instant,
    pub debounce: Duration,
    pub history_limit: usize,
}

impl ReduceContext {
    pub fn new(now: Instant, options: &EditorOptions) -> Self {
        Self {
            now,
            debounce: options.history_debounce(),
            history_limit: options.history_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recording {
    On,
    /// Inside a transaction; the transaction records once at the end.
    Off,
}

pub fn reduce(mut state: EditorState, action: Action, ctx: &ReduceContext) -> EditorState {
    apply(&mut state, action, ctx, Recording::On);
    state
}

/// Like [`reduce`], also reporting whether anything changed.
pub(crate) fn reduce_tracked(
    mut state: EditorState,
    action: Action,
    ctx: &ReduceContext,
) -> (EditorState, bool) {
    let changed = apply(&mut state, action, ctx, Recording::On);
    (state, changed)
}

fn commit(state: &mut EditorState, before: Vec<Block>, ctx: &ReduceContext, recording: Recording) {
    if recording == Recording::On {
        state.history.record(before, ctx.history_limit);
    }
}

fn apply(
    state: &mut EditorState,
    action: Action,
    ctx: &ReduceContext,
    recording: Recording,
) -> bool {
    match action {
        Action::SetBlocks(blocks) => {
            let blocks = with_unique_ids(blocks);
            if blocks == state.blocks {
                return false;
            }
            let before = std::mem::replace(&mut state.blocks, blocks);
            state.prune_references();
            commit(state, before, ctx, recording);
            true
        }
        Action::AddBlock { block, index } => {
            if state.index_of(&block.id).is_some() {
                log::warn!("not adding block {}: id already in use", block.id);
                return false;
            }
            let len = state.blocks.len();
            let index = index.unwrap_or(len).min(len);
            let before = state.blocks.clone();
            state.blocks.insert(index, block);
            commit(state, before, ctx, recording);
            true
        }
        Action::UpdateBlock { id, changes } => {
            let Some(index) = state.index_of(&id) else {
                return false;
            };
            let next = changes.merged_into(&state.blocks[index]);
            if next == state.blocks[index] {
                return false;
            }
            let retyped = next.block_type != state.blocks[index].block_type;
            let before = state.blocks.clone();
            state.blocks[index] = next;
            if recording == Recording::On {
                if retyped {
                    state.history.record(before, ctx.history_limit);
                } else {
                    state.history.record_update(
                        before,
                        &id,
                        ctx.now,
                        ctx.debounce,
                        ctx.history_limit,
                    );
                }
            }
            true
        }
        Action::DeleteBlock(id) => {
            let Some(index) = state.index_of(&id) else {
                return false;
            };
            let before = state.blocks.clone();
            state.blocks.remove(index);
            if state.focused_block_id.as_ref() == Some(&id) {
                state.focused_block_id = None;
            }
            state.selected_block_ids.shift_remove(&id);
            commit(state, before, ctx, recording);
            true
        }
        Action::MoveBlock { id, new_index } => {
            let Some(from) = state.index_of(&id) else {
                return false;
            };
            let to = new_index.min(state.blocks.len() - 1);
            if to == from {
                return false;
            }
            let before = state.blocks.clone();
            let block = state.blocks.remove(from);
            state.blocks.insert(to, block);
            commit(state, before, ctx, recording);
            true
        }
        Action::DuplicateBlock(id) => {
            let Some(index) = state.index_of(&id) else {
                return false;
            };
            let copy = state.blocks[index].duplicate();
            let copy_id = copy.id.clone();
            let before = state.blocks.clone();
            state.blocks.insert(index + 1, copy);
            state.focused_block_id = Some(copy_id);
            commit(state, before, ctx, recording);
            true
        }
        Action::ReplaceBlock { id, with } => {
            let Some(index) = state.index_of(&id) else {
                return false;
            };
            if with.id != id && state.index_of(&with.id).is_some() {
                log::warn!("not replacing block {id}: id {} already in use", with.id);
                return false;
            }
            if state.blocks[index] == with {
                return false;
            }
            let new_id = with.id.clone();
            let before = state.blocks.clone();
            state.blocks[index] = with;
            if new_id != id {
                if state.focused_block_id.as_ref() == Some(&id) {
                    state.focused_block_id = Some(new_id.clone());
                }
                if state.selected_block_ids.shift_remove(&id) {
                    state.selected_block_ids.insert(new_id);
                }
            }
            commit(state, before, ctx, recording);
            true
        }
        Action::SelectBlock { id, additive } => {
            if state.index_of(&id).is_none() {
                return false;
            }
            if additive {
                if !state.selected_block_ids.shift_remove(&id) {
                    state.selected_block_ids.insert(id);
                }
            } else {
                if state.selected_block_ids.len() == 1 && state.is_selected(&id) {
                    return false;
                }
                state.selected_block_ids.clear();
                state.selected_block_ids.insert(id);
            }
            true
        }
        Action::ClearSelection => {
            if state.selected_block_ids.is_empty() {
                return false;
            }
            state.selected_block_ids.clear();
            true
        }
        Action::SetFocus(target) => {
            if let Some(id) = &target
                && state.index_of(id).is_none()
            {
                return false;
            }
            if state.focused_block_id == target {
                return false;
            }
            state.focused_block_id = target;
            state.history.break_coalescing();
            true
        }
        Action::ReportError(error) => {
            state.errors.push(error);
            true
        }
        Action::ClearErrors => {
            if state.errors.is_empty() {
                return false;
            }
            state.errors.clear();
            true
        }
        Action::Undo | Action::Redo if recording == Recording::Off => {
            log::debug!("history navigation ignored inside a transaction");
            false
        }
        Action::Undo => {
            if !state.history.can_undo() {
                return false;
            }
            let current = state.blocks.clone();
            match state.history.undo(current) {
                Some(previous) => {
                    state.blocks = previous;
                    state.prune_references();
                    true
                }
                None => false,
            }
        }
        Action::Redo => {
            if !state.history.can_redo() {
                return false;
            }
            let current = state.blocks.clone();
            match state.history.redo(current) {
                Some(next) => {
                    state.blocks = next;
                    state.prune_references();
                    true
                }
                None => false,
            }
        }
        Action::Transaction(actions) => {
            let before = state.blocks.clone();
            let mut changed = false;
            for action in actions {
                changed |= apply(state, action, ctx, Recording::Off);
            }
            if state.blocks != before {
                commit(state, before, ctx, recording);
            }
            changed
        }
    }
}
