pub mod block;

pub use block::{Block, BlockChanges, BlockId, ListType, Meta, types};
