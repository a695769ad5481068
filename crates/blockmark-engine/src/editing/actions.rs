use crate::error::EditorError;
use crate::models::{Block, BlockChanges, BlockId};

/// The closed set of state transitions. Every change to an [`EditorState`]
/// goes through one of these.
///
/// [`EditorState`]: super::EditorState
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the whole sequence (undoable).
    SetBlocks(Vec<Block>),
    /// Insert at `index`, or append. Indices past the end append.
    AddBlock { block: Block, index: Option<usize> },
    /// Shallow merge of `changes` into the block.
    UpdateBlock { id: BlockId, changes: BlockChanges },
    DeleteBlock(BlockId),
    /// `new_index` counts positions in the sequence without the moved block.
    MoveBlock { id: BlockId, new_index: usize },
    /// Insert a copy right after the block and focus it.
    DuplicateBlock(BlockId),
    ReplaceBlock { id: BlockId, with: Block },
    /// `additive` toggles the block in the selection instead of replacing it.
    SelectBlock { id: BlockId, additive: bool },
    ClearSelection,
    SetFocus(Option<BlockId>),
    ReportError(EditorError),
    ClearErrors,
    Undo,
    Redo,
    /// Apply nested actions as a single undo step.
    Transaction(Vec<Action>),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetBlocks(_) => "SetBlocks",
            Action::AddBlock { .. } => "AddBlock",
            Action::UpdateBlock { .. } => "UpdateBlock",
            Action::DeleteBlock(_) => "DeleteBlock",
            Action::MoveBlock { .. } => "MoveBlock",
            Action::DuplicateBlock(_) => "DuplicateBlock",
            Action::ReplaceBlock { .. } => "ReplaceBlock",
            Action::SelectBlock { .. } => "SelectBlock",
            Action::ClearSelection => "ClearSelection",
            Action::SetFocus(_) => "SetFocus",
            Action::ReportError(_) => "ReportError",
            Action::ClearErrors => "ClearErrors",
            Action::Undo => "Undo",
            Action::Redo => "Redo",
            Action::Transaction(_) => "Transaction",
        }
    }
}
