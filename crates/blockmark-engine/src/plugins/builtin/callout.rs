//! `> [!TYPE] Title` callouts.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Block, types};
use crate::plugins::{
    BlockAction, BlockController, BlockPlugin, ComponentRef, MarkdownParser, MarkdownPlugin,
    MarkdownSerializer, MarkdownSyntax, SyntaxPatterns,
};

use super::{conversion_actions, manifest};

pub const PRIORITY: i32 = 90;
const DEFAULT_KIND: &str = "NOTE";

fn callout_regex() -> &'static Regex {
    static CALLOUT_REGEX: OnceLock<Regex> = OnceLock::new();
    CALLOUT_REGEX.get_or_init(|| {
        Regex::new(r"^>\s*\[!([A-Za-z]+)\][ \t]*(.*)$").expect("Invalid callout regex")
    })
}

pub struct CalloutSyntax;

impl MarkdownParser for CalloutSyntax {
    fn can_parse(&self, line: &str) -> bool {
        callout_regex().is_match(line)
    }

    fn parse_block(&self, line: &str) -> Option<Block> {
        let captures = callout_regex().captures(line)?;
        let kind = captures[1].to_uppercase();
        let title = captures[2].trim_end();
        Some(Block::new(types::CALLOUT, title).with_meta("calloutType", kind))
    }
}

impl MarkdownSerializer for CalloutSyntax {
    fn can_serialize(&self, block: &Block) -> bool {
        block.is(types::CALLOUT)
    }

    fn serialize_block(&self, block: &Block) -> Option<String> {
        let kind = block.meta_str("calloutType").unwrap_or(DEFAULT_KIND);
        if block.content.is_empty() {
            Some(format!("> [!{kind}]"))
        } else {
            Some(format!("> [!{kind}] {}", block.content))
        }
    }
}

pub struct CalloutController;

impl BlockController for CalloutController {
    fn get_actions(&self, _block: &Block) -> Vec<BlockAction> {
        conversion_actions(types::CALLOUT)
    }
}

pub fn markdown_plugin() -> MarkdownPlugin {
    MarkdownPlugin::new(
        manifest("core.callout.markdown", "Callout markdown"),
        MarkdownSyntax {
            patterns: SyntaxPatterns {
                inline: None,
                block: Some(callout_regex().clone()),
            },
            priority: PRIORITY,
        },
        CalloutSyntax,
        CalloutSyntax,
    )
}

pub fn block_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.callout", "Callout"),
        types::CALLOUT,
        ComponentRef::new("CalloutBlock"),
        CalloutController,
    )
}
