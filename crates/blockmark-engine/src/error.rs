use crate::models::BlockId;

/// Registration validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    #[error("plugin '{plugin_id}' is missing required field `{field}`")]
    MissingField {
        plugin_id: String,
        field: &'static str,
    },
    #[error("block plugin '{0}' has no controller")]
    MissingController(String),
    #[error("block plugin '{0}' has no renderable component")]
    MissingComponent(String),
    #[error("markdown plugin '{0}' has no block parser")]
    MissingParser(String),
    #[error("markdown plugin '{0}' has no block serializer")]
    MissingSerializer(String),
    #[error("a plugin with id '{0}' is already registered")]
    DuplicateId(String),
    #[error("no plugin with id '{0}' is registered")]
    UnknownPlugin(String),
}

impl PluginError {
    pub fn plugin_id(&self) -> &str {
        match self {
            PluginError::MissingField { plugin_id, .. } => plugin_id,
            PluginError::MissingController(id)
            | PluginError::MissingComponent(id)
            | PluginError::MissingParser(id)
            | PluginError::MissingSerializer(id)
            | PluginError::DuplicateId(id)
            | PluginError::UnknownPlugin(id) => id,
        }
    }
}

/// Everything that can land in the editor's error list. None of these is fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("markdown line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("no plugin renders block type '{block_type}' (block {block_id})")]
    RenderLookup {
        block_id: BlockId,
        block_type: String,
    },
    #[error("block {block_id} has unregistered type '{block_type}'")]
    Validation {
        block_id: BlockId,
        block_type: String,
    },
}

impl EditorError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Validation { .. })
    }
}
