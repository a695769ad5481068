//! Loading and saving documents.
//!
//! The format follows the file extension: `.md` / `.markdown` go through the
//! [`Transpiler`], `.json` is the `{id, type, content, meta}` block interchange array.

use std::fs;
use std::path::{Path, PathBuf};

use crate::markdown::{ParseReport, Transpiler};
use crate::models::Block;
use crate::plugins::PluginRegistry;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid block interchange: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("md" | "markdown") => Ok(DocumentFormat::Markdown),
            Some("json") => Ok(DocumentFormat::Json),
            _ => Err(IoError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

pub fn blocks_to_json(blocks: &[Block]) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(blocks)?)
}

pub fn blocks_from_json(json: &str) -> Result<Vec<Block>, IoError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a document into blocks. Markdown diagnostics are returned in the report.
pub fn read_document(path: &Path, registry: &PluginRegistry) -> Result<ParseReport, IoError> {
    let format = DocumentFormat::from_path(path)?;
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    match format {
        DocumentFormat::Markdown => Ok(Transpiler::new(registry).parse_with_report(&text)),
        DocumentFormat::Json => Ok(ParseReport {
            blocks: blocks_from_json(&text)?,
            diagnostics: vec![],
        }),
    }
}

/// Write blocks in the format chosen by the extension of `path`.
pub fn write_document(
    path: &Path,
    blocks: &[Block],
    registry: &PluginRegistry,
) -> Result<(), IoError> {
    let text = match DocumentFormat::from_path(path)? {
        DocumentFormat::Markdown => {
            let mut markdown = Transpiler::new(registry).serialize(blocks);
            markdown.push('\n');
            markdown
        }
        DocumentFormat::Json => blocks_to_json(blocks)?,
    };

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, text)?;
    Ok(())
}
