/*!
 * # Editing Core
 *
 * The document is a flat, ordered `Vec<Block>` owned by a [`BlockStore`]. Nothing in
 * the engine mutates blocks in place from the outside: every change is an [`Action`]
 * run through the [`reducer`], which consumes the current [`EditorState`] and returns
 * the next one.
 *
 * ## Module Structure
 *
 * - **`state`**: `EditorState` (blocks, focus, selection, errors, history)
 * - **`actions`**: the closed `Action` enum
 * - **`history`**: snapshot undo/redo with update coalescing and a size bound
 * - **`reducer`**: the pure transition function
 * - **`store`**: `BlockStore`, dispatch plus convenience operations and a version counter
 * - **`keyboard`**: key routing (global shortcuts, plugin hooks, defaults)
 * - **`reorder`**: drag-and-drop state machine issuing a single `MoveBlock`
 *
 * ## Usage Pattern
 *
 * ```rust
 * use blockmark_engine::editing::{Action, BlockStore};
 * use blockmark_engine::models::{Block, BlockChanges};
 *
 * let mut store = BlockStore::new(vec![Block::paragraph("Hello")]);
 * let id = store.blocks()[0].id.clone();
 *
 * store.update_block(&id, BlockChanges::content("Hello, world"));
 * store.dispatch(Action::DuplicateBlock(id));
 * assert_eq!(store.blocks().len(), 2);
 *
 * store.undo();
 * assert_eq!(store.blocks().len(), 1);
 * ```
 */

pub mod actions;
pub mod history;
pub mod keyboard;
pub mod reducer;
pub mod reorder;
pub mod state;
pub mod store;

pub use actions::Action;
pub use history::History;
pub use keyboard::{KeyOutcome, KeyboardRouter};
pub use reducer::{ReduceContext, reduce};
pub use reorder::{BlockLayout, DropOutcome, DropZone, ReorderEngine};
pub use state::EditorState;
pub use store::BlockStore;
