use crate::models::{Block, Meta, types};
use crate::plugins::defaults::{exit_to_paragraph, split_into};
use crate::plugins::{
    BlockAction, BlockController, BlockPlugin, ComponentRef, KeyHookContext, KeyHookResult,
};

use super::{conversion_actions, manifest};

pub struct ParagraphController;

impl BlockController for ParagraphController {
    fn get_actions(&self, _block: &Block) -> Vec<BlockAction> {
        conversion_actions(types::PARAGRAPH)
    }
}

/// Enter splits a heading into the heading and a following paragraph; Backspace
/// at the very start demotes it to a paragraph.
pub struct HeadingController;

impl BlockController for HeadingController {
    fn handle_enter(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        if ctx.event.modifiers.shift || ctx.block.content.is_empty() {
            return None;
        }
        Some(split_into(ctx, types::PARAGRAPH, Meta::new()))
    }

    fn handle_backspace(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        let at_start = ctx.caret.is_some_and(|caret| caret.is_at_start());
        (at_start && !ctx.block.content.is_empty()).then(|| exit_to_paragraph(ctx.block))
    }

    fn get_actions(&self, _block: &Block) -> Vec<BlockAction> {
        conversion_actions(types::HEADING)
    }
}

/// Enter on an empty quote leaves the quote.
pub struct QuoteController;

impl BlockController for QuoteController {
    fn handle_enter(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        if ctx.event.modifiers.shift {
            return None;
        }
        ctx.block
            .content
            .trim()
            .is_empty()
            .then(|| exit_to_paragraph(ctx.block))
    }

    fn get_actions(&self, _block: &Block) -> Vec<BlockAction> {
        conversion_actions(types::QUOTE)
    }
}

pub fn paragraph_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.paragraph", "Paragraph"),
        types::PARAGRAPH,
        ComponentRef::new("ParagraphBlock"),
        ParagraphController,
    )
}

pub fn heading_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.heading", "Heading"),
        types::HEADING,
        ComponentRef::new("HeadingBlock"),
        HeadingController,
    )
}

pub fn quote_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.quote", "Quote"),
        types::QUOTE,
        ComponentRef::new("QuoteBlock"),
        QuoteController,
    )
}
