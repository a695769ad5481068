//! # Plugin Contract
//!
//! Everything the engine knows about a block type comes through one of two plugin
//! variants:
//!
//! - **`BlockPlugin`**: binds a block type to a render component handle and a
//!   [`BlockController`] carrying lifecycle, key and drag hooks.
//! - **`MarkdownPlugin`**: a prioritized bidirectional mapping between markdown lines
//!   and blocks (plus an optional inline pass).
//!
//! Controllers are traits whose hooks all have default bodies; the free functions in
//! [`defaults`] implement the shared behaviour a concrete controller can delegate to.
//! The engine never imports a concrete block type.

pub mod builtin;
pub mod defaults;
pub mod registry;

use regex::Regex;
use serde_json::Value;

use crate::editing::keyboard::{Caret, KeyEvent};
use crate::models::{Block, BlockChanges, BlockId};

pub use registry::{PluginRegistry, Registration, RenderTarget};

/// Identity shared by both plugin variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    pub id: String,
    pub name: String,
    pub version: String,
}

impl PluginManifest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Handle the rendering collaborator resolves to a concrete view for a block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef(pub String);

impl ComponentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// An action a block offers in its context menu or toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAction {
    pub id: String,
    pub label: String,
    /// Block type this action converts the block into, if it is a conversion.
    pub convert_to: Option<String>,
}

impl BlockAction {
    pub fn convert(block_type: &str, label: &str) -> Self {
        Self {
            id: format!("convert:{block_type}"),
            label: label.to_string(),
            convert_to: Some(block_type.to_string()),
        }
    }
}

/// Where the caret lands when focus moves to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretPlacement {
    Start,
    End,
    Offset(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTarget {
    pub block_id: BlockId,
    pub caret: CaretPlacement,
}

impl FocusTarget {
    pub fn start(block_id: BlockId) -> Self {
        Self {
            block_id,
            caret: CaretPlacement::Start,
        }
    }

    pub fn end(block_id: BlockId) -> Self {
        Self {
            block_id,
            caret: CaretPlacement::End,
        }
    }
}

/// Everything a key hook gets to see about the focused block.
#[derive(Debug, Clone, Copy)]
pub struct KeyHookContext<'a> {
    pub block: &'a Block,
    pub index: usize,
    pub blocks: &'a [Block],
    pub event: &'a KeyEvent,
    pub caret: Option<Caret>,
}

impl KeyHookContext<'_> {
    pub fn previous(&self) -> Option<&Block> {
        self.index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    pub fn next(&self) -> Option<&Block> {
        self.blocks.get(self.index + 1)
    }
}

/// Several edits applied together as a single undo step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeEdit {
    /// Inserted directly after the focused block, in order.
    pub new_blocks: Vec<Block>,
    pub updates: Vec<(BlockId, BlockChanges)>,
    pub focus: Option<FocusTarget>,
}

/// What a key hook can return. Returning any of these swallows the key event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyHookResult {
    /// Replace the focused block with this block.
    Replace(Block),
    /// Replace the focused block with these blocks (block split).
    Split(Vec<Block>),
    Composite(CompositeEdit),
}

/// Behaviour hooks of a block type. Every hook has a default.
pub trait BlockController {
    fn on_create(&self, block: Block) -> Block {
        block
    }

    fn on_update(&self, _previous: &Block, next: Block) -> Block {
        next
    }

    fn on_delete(&self, _block: &Block) {}

    fn handle_enter(&self, _ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        None
    }

    fn handle_backspace(&self, _ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        None
    }

    fn handle_tab(&self, _ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        None
    }

    fn handle_key_press(&self, _ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        None
    }

    fn can_drag(&self, _block: &Block) -> bool {
        true
    }

    /// Whether `dragged` may be dropped at the position of `target`.
    fn can_drop(&self, _dragged: &Block, _target: &Block) -> bool {
        true
    }

    fn on_drop(&self, _block: &Block, _from: usize, _to: usize) {}

    fn get_actions(&self, _block: &Block) -> Vec<BlockAction> {
        Vec::new()
    }
}

/// Binds a block type to its component and controller.
pub struct BlockPlugin {
    pub manifest: PluginManifest,
    pub block_type: String,
    pub controller: Option<Box<dyn BlockController>>,
    pub component: Option<ComponentRef>,
    pub toolbar: Option<Vec<BlockAction>>,
    pub settings: Option<Value>,
}

impl BlockPlugin {
    pub fn new(
        manifest: PluginManifest,
        block_type: impl Into<String>,
        component: ComponentRef,
        controller: impl BlockController + 'static,
    ) -> Self {
        Self {
            manifest,
            block_type: block_type.into(),
            controller: Some(Box::new(controller)),
            component: Some(component),
            toolbar: None,
            settings: None,
        }
    }

    pub fn with_toolbar(mut self, toolbar: Vec<BlockAction>) -> Self {
        self.toolbar = Some(toolbar);
        self
    }

    /// The controller hooks; a validated plugin always has one.
    pub fn controller(&self) -> &dyn BlockController {
        match &self.controller {
            Some(controller) => controller.as_ref(),
            None => &defaults::DefaultController,
        }
    }
}

impl std::fmt::Debug for BlockPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPlugin")
            .field("manifest", &self.manifest)
            .field("block_type", &self.block_type)
            .field("controller", &self.controller.is_some())
            .field("component", &self.component)
            .finish()
    }
}

/// Line-level parsing half of a markdown plugin.
pub trait MarkdownParser {
    fn can_parse(&self, line: &str) -> bool;

    fn parse_block(&self, line: &str) -> Option<Block>;

    /// Rewrite inline syntax in already html-escaped text into render markup.
    fn parse_inline(&self, _text: &str) -> Option<String> {
        None
    }
}

/// Serialization half of a markdown plugin.
pub trait MarkdownSerializer {
    fn can_serialize(&self, block: &Block) -> bool;

    fn serialize_block(&self, block: &Block) -> Option<String>;

    /// Inverse of [`MarkdownParser::parse_inline`].
    fn serialize_inline(&self, _markup: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxPatterns {
    pub inline: Option<Regex>,
    pub block: Option<Regex>,
}

#[derive(Debug, Clone, Default)]
pub struct MarkdownSyntax {
    pub patterns: SyntaxPatterns,
    /// Higher priorities get first refusal on every line and block.
    pub priority: i32,
}

pub struct MarkdownPlugin {
    pub manifest: PluginManifest,
    pub syntax: MarkdownSyntax,
    pub parser: Option<Box<dyn MarkdownParser>>,
    pub serializer: Option<Box<dyn MarkdownSerializer>>,
}

impl MarkdownPlugin {
    pub fn new(
        manifest: PluginManifest,
        syntax: MarkdownSyntax,
        parser: impl MarkdownParser + 'static,
        serializer: impl MarkdownSerializer + 'static,
    ) -> Self {
        Self {
            manifest,
            syntax,
            parser: Some(Box::new(parser)),
            serializer: Some(Box::new(serializer)),
        }
    }

    pub fn priority(&self) -> i32 {
        self.syntax.priority
    }
}

impl std::fmt::Debug for MarkdownPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownPlugin")
            .field("manifest", &self.manifest)
            .field("priority", &self.syntax.priority)
            .field("parser", &self.parser.is_some())
            .field("serializer", &self.serializer.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub enum Plugin {
    Block(BlockPlugin),
    Markdown(MarkdownPlugin),
}

impl Plugin {
    pub fn manifest(&self) -> &PluginManifest {
        match self {
            Plugin::Block(plugin) => &plugin.manifest,
            Plugin::Markdown(plugin) => &plugin.manifest,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest().id
    }

    pub fn as_block(&self) -> Option<&BlockPlugin> {
        match self {
            Plugin::Block(plugin) => Some(plugin),
            Plugin::Markdown(_) => None,
        }
    }

    pub fn as_markdown(&self) -> Option<&MarkdownPlugin> {
        match self {
            Plugin::Markdown(plugin) => Some(plugin),
            Plugin::Block(_) => None,
        }
    }
}

impl From<BlockPlugin> for Plugin {
    fn from(plugin: BlockPlugin) -> Self {
        Plugin::Block(plugin)
    }
}

impl From<MarkdownPlugin> for Plugin {
    fn from(plugin: MarkdownPlugin) -> Self {
        Plugin::Markdown(plugin)
    }
}
