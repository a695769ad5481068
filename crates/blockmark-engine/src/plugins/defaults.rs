//! Shared hook behaviour concrete controllers delegate to.

use serde_json::Value;

use crate::models::{Block, Meta, types};

use super::{BlockController, KeyHookContext, KeyHookResult};

/// Controller with every hook left at its default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultController;

impl BlockController for DefaultController {}

/// Deepest `level` a list-like block can be indented to.
pub const MAX_LEVEL: usize = 8;

fn byte_index(content: &str, char_offset: usize) -> usize {
    content
        .char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(content.len())
}

/// Split the focused block's content around the caret selection.
///
/// Without caret information the whole content stays before the split.
pub fn split_at_caret(ctx: &KeyHookContext<'_>) -> (String, String) {
    let content = &ctx.block.content;
    match ctx.caret {
        Some(caret) => {
            let start = byte_index(content, caret.start.min(caret.end));
            let end = byte_index(content, caret.start.max(caret.end));
            (content[..start].to_string(), content[end..].to_string())
        }
        None => (content.clone(), String::new()),
    }
}

/// Split the focused block at the caret; the tail moves into a new block of
/// `next_type` with `next_meta`.
pub fn split_into(ctx: &KeyHookContext<'_>, next_type: &str, next_meta: Meta) -> KeyHookResult {
    let (before, after) = split_at_caret(ctx);
    let mut head = ctx.block.clone();
    head.content = before;
    let mut tail = Block::new(next_type, after);
    tail.meta = next_meta;
    KeyHookResult::Split(vec![head, tail])
}

/// Turn the focused block into a paragraph, keeping its id and content.
pub fn exit_to_paragraph(block: &Block) -> KeyHookResult {
    KeyHookResult::Replace(Block {
        id: block.id.clone(),
        block_type: types::PARAGRAPH.to_string(),
        content: block.content.clone(),
        meta: Meta::new(),
    })
}

/// Copy of `block` with its `level` moved by `delta`, clamped to `0..=MAX_LEVEL`.
pub fn shift_level(block: &Block, delta: isize) -> Block {
    let level = (block.level() as isize + delta).clamp(0, MAX_LEVEL as isize) as u64;
    let mut next = block.clone();
    next.meta.insert("level".to_string(), Value::from(level));
    next
}

/// Tab indents, Shift+Tab outdents.
pub fn indent_on_tab(ctx: &KeyHookContext<'_>) -> KeyHookResult {
    let delta = if ctx.event.modifiers.shift { -1 } else { 1 };
    KeyHookResult::Replace(shift_level(ctx.block, delta))
}

/// Replace the caret selection with `text`.
pub fn insert_at_caret(ctx: &KeyHookContext<'_>, text: &str) -> Block {
    let (before, after) = split_at_caret(ctx);
    let mut next = ctx.block.clone();
    next.content = format!("{before}{text}{after}");
    next
}

/// Empty paragraph inserted after the focused block by the default Enter.
pub fn empty_paragraph() -> Block {
    Block::paragraph("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::keyboard::{Caret, Key, KeyEvent, Modifiers};
    use pretty_assertions::assert_eq;

    fn ctx<'a>(
        blocks: &'a [Block],
        event: &'a KeyEvent,
        caret: Option<Caret>,
    ) -> KeyHookContext<'a> {
        KeyHookContext {
            block: &blocks[0],
            index: 0,
            blocks,
            event,
            caret,
        }
    }

    #[test]
    fn split_respects_multibyte_offsets() {
        let blocks = vec![Block::paragraph("héllo wörld")];
        let event = KeyEvent::plain(Key::Enter);
        let (before, after) = split_at_caret(&ctx(&blocks, &event, Some(Caret::at(5))));
        assert_eq!(before, "héllo");
        assert_eq!(after, " wörld");
    }

    #[test]
    fn split_drops_selected_text() {
        let blocks = vec![Block::paragraph("abcdef")];
        let event = KeyEvent::plain(Key::Enter);
        let caret = Caret { start: 4, end: 2 };
        let (before, after) = split_at_caret(&ctx(&blocks, &event, Some(caret)));
        assert_eq!((before.as_str(), after.as_str()), ("ab", "ef"));
    }

    #[test]
    fn shift_level_clamps() {
        let block = Block::checklist(false, 0, "x");
        assert_eq!(shift_level(&block, -1).level(), 0);
        assert_eq!(shift_level(&block, 2).level(), 2);
        assert_eq!(shift_level(&block, 100).level(), MAX_LEVEL);
    }

    #[test]
    fn shift_tab_outdents() {
        let blocks = vec![Block::checklist(false, 2, "x")];
        let event = KeyEvent::new(Key::Tab, Modifiers::shift());
        let KeyHookResult::Replace(block) = indent_on_tab(&ctx(&blocks, &event, None)) else {
            panic!("expected replacement");
        };
        assert_eq!(block.level(), 1);
    }

    #[test]
    fn insert_without_caret_appends() {
        let blocks = vec![Block::code("rust", "fn main() {")];
        let event = KeyEvent::plain(Key::Enter);
        let next = insert_at_caret(&ctx(&blocks, &event, None), "\n");
        assert_eq!(next.content, "fn main() {\n");
        assert_eq!(next.id, blocks[0].id);
    }
}
