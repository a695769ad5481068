use serde_json::Value;

use crate::editing::keyboard::Key;
use crate::models::{Block, types};
use crate::plugins::defaults::{exit_to_paragraph, indent_on_tab, shift_level, split_into};
use crate::plugins::{
    BlockAction, BlockController, BlockPlugin, ComponentRef, KeyHookContext, KeyHookResult,
};

use super::{conversion_actions, manifest};

/// Shared Enter/Backspace rules of list-like blocks: an empty item outdents, and
/// at level 0 it turns back into a paragraph.
fn leave_or_outdent(block: &Block) -> KeyHookResult {
    if block.level() > 0 {
        KeyHookResult::Replace(shift_level(block, -1))
    } else {
        exit_to_paragraph(block)
    }
}

pub struct ListController;

impl BlockController for ListController {
    fn handle_enter(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        if ctx.event.modifiers.shift {
            return None;
        }
        if ctx.block.content.trim().is_empty() {
            return Some(leave_or_outdent(ctx.block));
        }
        Some(split_into(ctx, types::LIST, ctx.block.meta.clone()))
    }

    fn handle_backspace(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        ctx.caret
            .is_some_and(|caret| caret.is_at_start())
            .then(|| leave_or_outdent(ctx.block))
    }

    fn handle_tab(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        Some(indent_on_tab(ctx))
    }

    fn get_actions(&self, _block: &Block) -> Vec<BlockAction> {
        conversion_actions(types::LIST)
    }
}

/// Like lists, plus Ctrl/Cmd+Space toggles the checkbox.
pub struct ChecklistController;

impl BlockController for ChecklistController {
    fn handle_enter(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        if ctx.event.modifiers.shift {
            return None;
        }
        if ctx.block.content.trim().is_empty() {
            return Some(leave_or_outdent(ctx.block));
        }
        let mut meta = ctx.block.meta.clone();
        meta.insert("checked".to_string(), Value::Bool(false));
        Some(split_into(ctx, types::CHECKLIST, meta))
    }

    fn handle_backspace(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        ctx.caret
            .is_some_and(|caret| caret.is_at_start())
            .then(|| leave_or_outdent(ctx.block))
    }

    fn handle_tab(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        Some(indent_on_tab(ctx))
    }

    fn handle_key_press(&self, ctx: &KeyHookContext<'_>) -> Option<KeyHookResult> {
        if ctx.event.key != Key::Char(' ') || !ctx.event.modifiers.has_primary() {
            return None;
        }
        let checked = ctx.block.meta_bool("checked").unwrap_or(false);
        let mut toggled = ctx.block.clone();
        toggled
            .meta
            .insert("checked".to_string(), Value::Bool(!checked));
        Some(KeyHookResult::Replace(toggled))
    }

    fn get_actions(&self, block: &Block) -> Vec<BlockAction> {
        let label = if block.meta_bool("checked").unwrap_or(false) {
            "Mark as not done"
        } else {
            "Mark as done"
        };
        let mut actions = vec![BlockAction {
            id: "checklist:toggle".to_string(),
            label: label.to_string(),
            convert_to: None,
        }];
        actions.extend(conversion_actions(types::CHECKLIST));
        actions
    }
}

pub fn list_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.list", "List"),
        types::LIST,
        ComponentRef::new("ListBlock"),
        ListController,
    )
}

pub fn checklist_plugin() -> BlockPlugin {
    BlockPlugin::new(
        manifest("core.checklist", "Checklist"),
        types::CHECKLIST,
        ComponentRef::new("ChecklistBlock"),
        ChecklistController,
    )
}
