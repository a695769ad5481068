//! Promotion of a single typed line into a structured block.
//!
//! While the user types into a paragraph, `# Title` becomes a heading, `- item` a list
//! entry and so on. Detection only looks at single-line, non-blank content; the first
//! matching rule wins and its marker is stripped from the content.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::markdown::fence::{CodeFence, FenceKind};
use crate::markdown::rules;
use crate::models::{Block, BlockChanges, ListType, Meta, types};

fn heading_regex() -> &'static Regex {
    static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADING_REGEX.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("Invalid heading regex"))
}

fn quote_regex() -> &'static Regex {
    static QUOTE_REGEX: OnceLock<Regex> = OnceLock::new();
    QUOTE_REGEX.get_or_init(|| Regex::new(r"^>\s+(.+)$").expect("Invalid quote regex"))
}

fn checklist_regex() -> &'static Regex {
    static CHECKLIST_REGEX: OnceLock<Regex> = OnceLock::new();
    CHECKLIST_REGEX.get_or_init(|| {
        Regex::new(r"^(\s*)-\s+\[([ x])\]\s+(.+)$").expect("Invalid checklist regex")
    })
}

fn list_regex() -> &'static Regex {
    static LIST_REGEX: OnceLock<Regex> = OnceLock::new();
    LIST_REGEX
        .get_or_init(|| Regex::new(r"^(\s*)([-*+]|\d+\.)\s+(.+)$").expect("Invalid list regex"))
}

/// Result of a successful detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub block_type: &'static str,
    pub content: String,
    pub meta: Meta,
}

impl Transform {
    fn from_block(block: Block, block_type: &'static str) -> Self {
        Self {
            block_type,
            content: block.content,
            meta: block.meta,
        }
    }

    pub fn into_changes(self) -> BlockChanges {
        BlockChanges {
            block_type: Some(self.block_type.to_string()),
            content: Some(self.content),
            meta: Some(self.meta),
        }
    }
}

fn group<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map(|m| m.as_str()).unwrap_or("")
}

/// Detect a block promotion for the proposed content of a block.
pub fn detect(content: &str) -> Option<Transform> {
    if content.trim().is_empty() || content.contains('\n') {
        return None;
    }

    if let Some(c) = heading_regex().captures(content) {
        let block = Block::heading(group(&c, 1).len() as u8, group(&c, 2));
        return Some(Transform::from_block(block, types::HEADING));
    }
    if let Some(c) = quote_regex().captures(content) {
        return Some(Transform::from_block(Block::quote(group(&c, 1)), types::QUOTE));
    }
    if content.starts_with(CodeFence::BACKTICKS) {
        let block = Block::code(CodeFence::language(content, FenceKind::Backticks), "");
        return Some(Transform::from_block(block, types::CODE));
    }
    if let Some(c) = checklist_regex().captures(content) {
        let block = Block::checklist(
            group(&c, 2) == "x",
            rules::indent_level(group(&c, 1)),
            group(&c, 3),
        );
        return Some(Transform::from_block(block, types::CHECKLIST));
    }
    if let Some(c) = list_regex().captures(content) {
        let list_type = if group(&c, 2).ends_with('.') {
            ListType::Ordered
        } else {
            ListType::Unordered
        };
        let block = Block::list(list_type, rules::indent_level(group(&c, 1)), group(&c, 3));
        return Some(Transform::from_block(block, types::LIST));
    }
    if let Some(c) = rules::divider_regex().captures(content) {
        let block = Block::divider().with_meta("style", group(&c, 1));
        return Some(Transform::from_block(block, types::DIVIDER));
    }
    None
}

/// Rewrite a content update into a conversion when its new content matches a rule.
///
/// Changes without content, or whose content matches nothing, are returned untouched.
pub fn apply_transform(changes: BlockChanges) -> BlockChanges {
    match changes.content.as_deref().and_then(detect) {
        Some(transform) => transform.into_changes(),
        None => changes,
    }
}
