//! Drag-and-drop reordering.
//!
//! `Idle -> Dragging -> Idle`, driven by [`ReorderEngine::start`],
//! [`ReorderEngine::pointer_move`] and [`ReorderEngine::end`] / [`ReorderEngine::cancel`].
//! A drag commits at most one `MoveBlock`, so the sequence length never changes.

use crate::models::BlockId;
use crate::options::EditorOptions;
use crate::plugins::PluginRegistry;

use super::BlockStore;

/// Vertical extent of one rendered block, in host pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub id: BlockId,
    pub top: f32,
    pub height: f32,
}

impl BlockLayout {
    fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// An insertion index the dragged block can be dropped at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZone {
    pub index: usize,
    pub center: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Committed {
        block_id: BlockId,
        from: usize,
        to: usize,
    },
    /// No zone was active when the pointer was released.
    NoTarget,
    /// The destination plugin refused the drop.
    Rejected,
    Cancelled,
    NotDragging,
}

#[derive(Debug, Clone)]
struct Drag {
    block_id: BlockId,
    source: usize,
    origin_y: f32,
    pointer_y: f32,
    zones: Vec<DropZone>,
    target: Option<usize>,
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(Drag),
}

#[derive(Debug, Clone)]
pub struct ReorderEngine {
    state: DragState,
    proximity: f32,
}

fn drop_zones(layout: &[BlockLayout], source: usize) -> Vec<DropZone> {
    (0..=layout.len())
        .filter(|&index| index != source && index != source + 1)
        .map(|index| {
            let center = match index {
                0 => layout[0].top,
                i if i == layout.len() => layout[i - 1].bottom(),
                i => (layout[i - 1].bottom() + layout[i].top) / 2.0,
            };
            DropZone { index, center }
        })
        .collect()
}

impl ReorderEngine {
    pub fn new(options: &EditorOptions) -> Self {
        Self {
            state: DragState::Idle,
            proximity: options.drop_proximity_px,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn dragged(&self) -> Option<&BlockId> {
        match &self.state {
            DragState::Dragging(drag) => Some(&drag.block_id),
            DragState::Idle => None,
        }
    }

    pub fn active_target(&self) -> Option<usize> {
        match &self.state {
            DragState::Dragging(drag) => drag.target,
            DragState::Idle => None,
        }
    }

    pub fn zones(&self) -> &[DropZone] {
        match &self.state {
            DragState::Dragging(drag) => &drag.zones,
            DragState::Idle => &[],
        }
    }

    /// Pointer travel since the drag started, for positioning a drag preview.
    pub fn pointer_offset(&self) -> Option<f32> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.pointer_y - drag.origin_y),
            DragState::Idle => None,
        }
    }

    /// Begin dragging `block_id`. `layout` must describe every block in sequence order.
    ///
    /// Returns `false` when a drag is already running, the layout does not match the
    /// sequence, or the block's plugin refuses `can_drag`.
    pub fn start(
        &mut self,
        block_id: &BlockId,
        pointer_y: f32,
        layout: &[BlockLayout],
        store: &BlockStore,
        registry: &PluginRegistry,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let blocks = store.blocks();
        let aligned = layout.len() == blocks.len()
            && layout.iter().zip(blocks).all(|(l, b)| l.id == b.id);
        if !aligned {
            log::warn!("drag of {block_id} refused: layout does not match the sequence");
            return false;
        }
        let Some(source) = store.state().index_of(block_id) else {
            return false;
        };
        let block = &blocks[source];
        if !registry.controller_for(&block.block_type).can_drag(block) {
            return false;
        }

        self.state = DragState::Dragging(Drag {
            block_id: block_id.clone(),
            source,
            origin_y: pointer_y,
            pointer_y,
            zones: drop_zones(layout, source),
            target: None,
        });
        true
    }

    /// Track the pointer; the nearest zone within the proximity threshold becomes
    /// the active target.
    pub fn pointer_move(&mut self, y: f32) -> Option<usize> {
        let DragState::Dragging(drag) = &mut self.state else {
            return None;
        };
        drag.pointer_y = y;
        drag.target = drag
            .zones
            .iter()
            .map(|zone| (zone.index, (zone.center - y).abs()))
            .filter(|(_, distance)| *distance <= self.proximity)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        drag.target
    }

    /// Release the pointer, committing the move when a target is active and accepted.
    ///
    /// The drag is cancelled when the dragged block was removed or shifted since
    /// `start`, as the drop zones no longer match the sequence.
    pub fn end(&mut self, store: &mut BlockStore, registry: &PluginRegistry) -> DropOutcome {
        let DragState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return DropOutcome::NotDragging;
        };
        let Some(target) = drag.target else {
            return DropOutcome::NoTarget;
        };
        let Some(from) = store.state().index_of(&drag.block_id) else {
            log::debug!("drag of {} cancelled: block is gone", drag.block_id);
            return DropOutcome::Cancelled;
        };
        if from != drag.source {
            log::debug!(
                "drag of {} cancelled: block moved from {} to {from}",
                drag.block_id,
                drag.source
            );
            return DropOutcome::Cancelled;
        }
        let blocks = store.blocks();
        let dragged = blocks[from].clone();
        let Some(destination) = blocks.get(target).or(blocks.last()) else {
            return DropOutcome::Cancelled;
        };
        if !registry
            .controller_for(&destination.block_type)
            .can_drop(&dragged, destination)
        {
            log::debug!("drop of {} at {target} rejected", drag.block_id);
            return DropOutcome::Rejected;
        }

        let to = if target > from { target - 1 } else { target };
        if !store.move_block(&drag.block_id, to) {
            return DropOutcome::NoTarget;
        }
        registry
            .controller_for(&dragged.block_type)
            .on_drop(&dragged, from, to);
        log::debug!("moved {} from {from} to {to}", drag.block_id);
        DropOutcome::Committed {
            block_id: drag.block_id,
            from,
            to,
        }
    }

    /// Abort the drag without touching the store, e.g. when the pointer leaves.
    pub fn cancel(&mut self) -> DropOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(_) => DropOutcome::Cancelled,
            DragState::Idle => DropOutcome::NotDragging,
        }
    }
}
