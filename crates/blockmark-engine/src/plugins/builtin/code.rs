use crate::models::{Block, types};
use crate::plugins::defaults::insert_at_caret;
use crate::plugins::{
    BlockAction, BlockController, BlockPlugin, ComponentRef, KeyHookContext, KeyHookResult,
};

use super::{conversion_actions, manifest};

const INDENT: &str = "    ";

/// Enter and Tab edit text inside the code block instead of creating blocks.
/// Primary+Enter is left to the global shortcut table.
pub struct CodeController;

impl BlockController for CodeController {
    fn handle_enter(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        if ctx.event.modifiers.has_primary() {
            return None;
        }
        Some(KeyHookResult::Replace(insert_at_caret(ctx, "\n")))
    }

    fn handle_tab(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        if ctx.event.modifiers.shift {
            return None;
        }
        Some(KeyHookResult::Replace(insert_at_caret(ctx, INDENT)))
    }

    fn get_actions(&self, _block: &Block) -> Vec<BlockAction> {
        conversion_actions(types::CODE)
    }
}

pub struct DividerController;

impl BlockController for DividerController {}

pub fn code_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.code", "Code"),
        types::CODE,
        ComponentRef::new("CodeBlock"),
        CodeController,
    )
}

pub fn divider_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.divider", "Divider"),
        types::DIVIDER,
        ComponentRef::new("DividerBlock"),
        DividerController,
    )
}
