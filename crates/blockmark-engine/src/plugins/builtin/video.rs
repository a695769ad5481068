//! `![video](url "title")` embeds.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Block, types};
use crate::plugins::{
    BlockController, BlockPlugin, ComponentRef, MarkdownParser, MarkdownPlugin,
    MarkdownSerializer, MarkdownSyntax, SyntaxPatterns,
};

use super::manifest;

pub const PRIORITY: i32 = 100;

fn video_regex() -> &'static Regex {
    static VIDEO_REGEX: OnceLock<Regex> = OnceLock::new();
    VIDEO_REGEX.get_or_init(|| {
        Regex::new(r#"^!\[video\]\((\S+?)(?:\s+"([^"]*)")?\)\s*$"#).expect("Invalid video regex")
    })
}

pub struct VideoSyntax;

impl MarkdownParser for VideoSyntax {
    fn can_parse(&self, line: &str) -> bool {
        video_regex().is_match(line.trim())
    }

    fn parse_block(&self, line: &str) -> Option<Block> {
        let captures = video_regex().captures(line.trim())?;
        let mut block = Block::new(types::VIDEO, &captures[1]);
        if let Some(title) = captures.get(2) {
            block = block.with_meta("title", title.as_str());
        }
        Some(block)
    }
}

impl MarkdownSerializer for VideoSyntax {
    fn can_serialize(&self, block: &Block) -> bool {
        block.is(types::VIDEO) && !block.content.trim().is_empty()
    }

    fn serialize_block(&self, block: &Block) -> Option<String> {
        let url = block.content.trim();
        match block.meta_str("title") {
            Some(title) => Some(format!("![video]({url} \"{title}\")")),
            None => Some(format!("![video]({url})")),
        }
    }
}

/// Videos have no editable text, so their key hooks stay at the defaults.
pub struct VideoController;

impl BlockController for VideoController {}

pub fn markdown_plugin() -> MarkdownPlugin {
    MarkdownPlugin::new(
        manifest("core.video.markdown", "Video markdown"),
        MarkdownSyntax {
            patterns: SyntaxPatterns {
                inline: None,
                block: Some(video_regex().clone()),
            },
            priority: PRIORITY,
        },
        VideoSyntax,
        VideoSyntax,
    )
}

pub fn block_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.video", "Video"),
        types::VIDEO,
        ComponentRef::new("VideoBlock"),
        VideoController,
    )
}
