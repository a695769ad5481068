use std::time::{Duration, Instant};

use crate::models::{Block, BlockId};

/// Last content update that may absorb a following one.
#[derive(Debug, Clone, PartialEq)]
struct UpdateMark {
    block_id: BlockId,
    at: Instant,
}

/// Linear undo/redo history of whole-sequence snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub past: Vec<Vec<Block>>,
    pub future: Vec<Vec<Block>>,
    last_update: Option<UpdateMark>,
}

impl History {
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Push the pre-mutation sequence. Starts a new undo step unconditionally.
    pub(crate) fn record(&mut self, snapshot: Vec<Block>, limit: usize) {
        self.last_update = None;
        self.push(snapshot, limit);
    }

    /// Push the pre-mutation sequence of a content update unless it continues the
    /// previous update of the same block within `debounce`.
    pub(crate) fn record_update(
        &mut self,
        snapshot: Vec<Block>,
        block_id: &BlockId,
        now: Instant,
        debounce: Duration,
        limit: usize,
    ) {
        let coalesces = !debounce.is_zero()
            && self.last_update.as_ref().is_some_and(|mark| {
                mark.block_id == *block_id && now.saturating_duration_since(mark.at) <= debounce
            });
        if coalesces {
            self.future.clear();
        } else {
            self.push(snapshot, limit);
        }
        self.last_update = Some(UpdateMark {
            block_id: block_id.clone(),
            at: now,
        });
    }

    /// Forget the coalescing marker so the next update opens a new step.
    pub(crate) fn break_coalescing(&mut self) {
        self.last_update = None;
    }

    pub(crate) fn undo(&mut self, current: Vec<Block>) -> Option<Vec<Block>> {
        let previous = self.past.pop()?;
        self.future.push(current);
        self.last_update = None;
        Some(previous)
    }

    pub(crate) fn redo(&mut self, current: Vec<Block>) -> Option<Vec<Block>> {
        let next = self.future.pop()?;
        self.past.push(current);
        self.last_update = None;
        Some(next)
    }

    fn push(&mut self, snapshot: Vec<Block>, limit: usize) {
        self.past.push(snapshot);
        if self.past.len() > limit {
            let overflow = self.past.len() - limit;
            self.past.drain(0..overflow);
        }
        self.future.clear();
    }
}
