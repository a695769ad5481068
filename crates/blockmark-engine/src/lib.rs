pub mod clock;
pub mod editing;
pub mod editor;
pub mod error;
pub mod io;
pub mod markdown;
pub mod models;
pub mod options;
pub mod plugins;
pub mod transform;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use clock::{Clock, ManualClock, SystemClock};
pub use editing::{Action, BlockStore, EditorState, KeyOutcome, KeyboardRouter, ReorderEngine};
pub use editor::{Editor, RenderEntry};
pub use error::{EditorError, PluginError};
pub use markdown::{ParseReport, Transpiler};
pub use models::{Block, BlockChanges, BlockId, ListType, Meta};
pub use options::EditorOptions;
pub use plugins::registry::{PluginRegistry, Registration, RenderTarget};
pub use transform::{Transform, apply_transform, detect};
