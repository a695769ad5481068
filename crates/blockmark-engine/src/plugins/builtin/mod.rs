//! Plugins shipped with the engine.
//!
//! - **`text`**: paragraph, heading, quote
//! - **`list`**: bulleted/numbered lists and checklists
//! - **`code`**: fenced code and dividers
//! - **`callout`**: `> [!TYPE] Title` blocks
//! - **`video`**: `![video](url "title")` blocks
//! - **`bold`**: `**strong**` inline rule

pub mod bold;
pub mod callout;
pub mod code;
pub mod list;
pub mod text;
pub mod video;

use crate::models::types;

use super::{BlockAction, BlockPlugin, MarkdownPlugin, Plugin, PluginManifest};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) fn manifest(id: &str, name: &str) -> PluginManifest {
    PluginManifest::new(id, name, VERSION)
}

/// Conversions offered by text-like blocks, excluding their own type.
pub(crate) fn conversion_actions(current: &str) -> Vec<BlockAction> {
    [
        (types::PARAGRAPH, "Text"),
        (types::HEADING, "Heading"),
        (types::QUOTE, "Quote"),
        (types::LIST, "List"),
        (types::CHECKLIST, "To-do"),
        (types::CODE, "Code"),
    ]
    .into_iter()
    .filter(|(block_type, _)| *block_type != current)
    .map(|(block_type, label)| BlockAction::convert(block_type, label))
    .collect()
}

pub fn block_plugins() -> Vec<BlockPlugin> {
    vec![
        text::paragraph_plugin(),
        text::heading_plugin(),
        text::quote_plugin(),
        list::list_plugin(),
        list::checklist_plugin(),
        code::code_plugin(),
        code::divider_plugin(),
        callout::block_plugin(),
        video::block_plugin(),
    ]
}

pub fn markdown_plugins() -> Vec<MarkdownPlugin> {
    vec![
        video::markdown_plugin(),
        callout::markdown_plugin(),
        bold::markdown_plugin(),
    ]
}

pub fn plugins() -> Vec<Plugin> {
    block_plugins()
        .into_iter()
        .map(Plugin::from)
        .chain(markdown_plugins().into_iter().map(Plugin::from))
        .collect()
}
