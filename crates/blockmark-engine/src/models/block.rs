use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open, type-specific attribute map carried by every block.
///
/// The engine never interprets it beyond the canonical keys of the built-in types.
pub type Meta = Map<String, Value>;

/// Type tags of the block types shipped with the engine.
pub mod types {
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const QUOTE: &str = "quote";
    pub const LIST: &str = "list";
    pub const CHECKLIST: &str = "checklist";
    pub const CODE: &str = "code";
    pub const DIVIDER: &str = "divider";
    pub const CALLOUT: &str = "callout";
    pub const VIDEO: &str = "video";
}

/// Opaque block identifier, unique for the lifetime of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a list block renders with bullets or numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Ordered,
    Unordered,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Ordered => "ordered",
            ListType::Unordered => "unordered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ordered" => Some(ListType::Ordered),
            "unordered" => Some(ListType::Unordered),
            _ => None,
        }
    }
}

/// The atomic unit of document content.
///
/// Serializes to the `{id, type, content, meta}` interchange shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub meta: Meta,
}

impl Block {
    /// Create a block with a freshly generated id and empty meta.
    pub fn new(block_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::generate(),
            block_type: block_type.into(),
            content: content.into(),
            meta: Meta::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(types::PARAGRAPH, content)
    }

    pub fn heading(level: u8, content: impl Into<String>) -> Self {
        Self::new(types::HEADING, content).with_meta("level", level.clamp(1, 6))
    }

    pub fn quote(content: impl Into<String>) -> Self {
        Self::new(types::QUOTE, content)
    }

    pub fn list(list_type: ListType, level: u64, content: impl Into<String>) -> Self {
        Self::new(types::LIST, content)
            .with_meta("listType", list_type.as_str())
            .with_meta("level", level)
    }

    pub fn checklist(checked: bool, level: u64, content: impl Into<String>) -> Self {
        Self::new(types::CHECKLIST, content)
            .with_meta("checked", checked)
            .with_meta("level", level)
    }

    pub fn code(language: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(types::CODE, content).with_meta("language", language.into())
    }

    pub fn divider() -> Self {
        Self::new(types::DIVIDER, "").with_meta("style", "---")
    }

    /// Copy of this block under a new id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: BlockId::generate(),
            ..self.clone()
        }
    }

    pub fn is(&self, block_type: &str) -> bool {
        self.block_type == block_type
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }

    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.meta.get(key).and_then(Value::as_u64)
    }

    pub fn meta_bool(&self, key: &str) -> Option<bool> {
        self.meta.get(key).and_then(Value::as_bool)
    }

    /// Heading level clamped to `1..=6`, defaulting to 1.
    pub fn heading_level(&self) -> usize {
        self.meta_u64("level").unwrap_or(1).clamp(1, 6) as usize
    }

    /// Nesting level of list-like blocks, defaulting to 0.
    pub fn level(&self) -> usize {
        self.meta_u64("level").unwrap_or(0) as usize
    }

    pub fn list_type(&self) -> ListType {
        self.meta_str("listType")
            .and_then(ListType::parse)
            .unwrap_or(ListType::Unordered)
    }
}

/// Partial update merged into a block by `UpdateBlock`.
///
/// Each present field replaces the block's field wholesale; `meta` is not deep-merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockChanges {
    pub block_type: Option<String>,
    pub content: Option<String>,
    pub meta: Option<Meta>,
}

impl BlockChanges {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn retype(block_type: impl Into<String>, meta: Meta) -> Self {
        Self {
            block_type: Some(block_type.into()),
            meta: Some(meta),
            ..Self::default()
        }
    }

    /// Changes that turn any block into `block` (apart from its id).
    pub fn from_block(block: Block) -> Self {
        Self {
            block_type: Some(block.block_type),
            content: Some(block.content),
            meta: Some(block.meta),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.block_type.is_none() && self.content.is_none() && self.meta.is_none()
    }

    /// Apply the changes to a copy of `block`.
    pub fn merged_into(&self, block: &Block) -> Block {
        Block {
            id: block.id.clone(),
            block_type: self
                .block_type
                .clone()
                .unwrap_or_else(|| block.block_type.clone()),
            content: self.content.clone().unwrap_or_else(|| block.content.clone()),
            meta: self.meta.clone().unwrap_or_else(|| block.meta.clone()),
        }
    }
}
