//! # Keyboard routing
//!
//! Every key event is offered, in order, to:
//!
//! 1. the global [`ShortcutTable`] (primary modifier chords), guarded against
//!    auto-repeat by a [`RepeatGuard`];
//! 2. the focused block's controller hook (`handle_enter`, `handle_backspace`,
//!    `handle_tab`, or `handle_key_press` for everything else);
//! 3. the built-in defaults: Enter inserts a paragraph, Backspace deletes or merges,
//!    ArrowUp/ArrowDown move block focus.
//!
//! Whatever a step does is applied to the store as one transaction, so a single key
//! press is always a single undo step.

pub mod keys;
pub mod shortcuts;

pub use keys::{Caret, Key, KeyEvent, Modifiers};
pub use shortcuts::{Command, Conversion, RepeatGuard, Shortcut, ShortcutTable};

use crate::models::{Block, BlockChanges, types};
use crate::options::EditorOptions;
use crate::plugins::defaults::empty_paragraph;
use crate::plugins::{
    CaretPlacement, CompositeEdit, FocusTarget, KeyHookContext, KeyHookResult, PluginRegistry,
};

use super::{Action, BlockStore};

/// What the router did with a key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not intercepted; the host should apply its native behaviour.
    Ignored,
    /// Swallowed. `focus` tells the host where to put the caret, if it moved.
    Handled { focus: Option<FocusTarget> },
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, KeyOutcome::Handled { .. })
    }

    pub fn focus(&self) -> Option<&FocusTarget> {
        match self {
            KeyOutcome::Handled { focus } => focus.as_ref(),
            KeyOutcome::Ignored => None,
        }
    }

    fn swallowed() -> Self {
        KeyOutcome::Handled { focus: None }
    }

    fn focused(target: FocusTarget) -> Self {
        KeyOutcome::Handled {
            focus: Some(target),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardRouter {
    shortcuts: ShortcutTable,
    guard: RepeatGuard,
}

impl KeyboardRouter {
    pub fn new(options: &EditorOptions) -> Self {
        Self::with_shortcuts(ShortcutTable::default(), options)
    }

    pub fn with_shortcuts(shortcuts: ShortcutTable, options: &EditorOptions) -> Self {
        Self {
            shortcuts,
            guard: RepeatGuard::new(options.shortcut_min_interval()),
        }
    }

    pub fn shortcuts(&self) -> &ShortcutTable {
        &self.shortcuts
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutTable {
        &mut self.shortcuts
    }

    /// Route one key event against the focused block of `store`.
    ///
    /// `caret` is the selection inside the focused block, when the host knows it.
    pub fn handle(
        &mut self,
        event: &KeyEvent,
        caret: Option<Caret>,
        store: &mut BlockStore,
        registry: &PluginRegistry,
    ) -> KeyOutcome {
        if let Some((shortcut, command)) = self.shortcuts.lookup(event) {
            if !self.guard.admit(shortcut, store.now()) {
                log::debug!("suppressed repeat of {command:?}");
                return KeyOutcome::swallowed();
            }
            return run_command(command, store, registry);
        }

        let Some(index) = store.state().focused_index() else {
            return KeyOutcome::Ignored;
        };

        if let Some(result) = offer_to_hook(event, caret, index, store, registry) {
            return apply_hook_result(result, index, caret, store, registry);
        }

        match event.key {
            Key::Enter if !event.modifiers.shift => insert_paragraph_after(index, store, registry),
            Key::Backspace => backspace(index, caret, store, registry),
            Key::ArrowUp if caret_on_first_line(store.blocks()[index].content.as_str(), caret) => {
                move_focus(index.checked_sub(1), store)
            }
            Key::ArrowDown if caret_on_last_line(store.blocks()[index].content.as_str(), caret) => {
                move_focus(Some(index + 1), store)
            }
            _ => KeyOutcome::Ignored,
        }
    }
}

fn offer_to_hook(
    event: &KeyEvent,
    caret: Option<Caret>,
    index: usize,
    store: &BlockStore,
    registry: &PluginRegistry,
) -> Option<KeyHookResult> {
    let blocks = store.blocks();
    let block = &blocks[index];
    let ctx = KeyHookContext {
        block,
        index,
        blocks,
        event,
        caret,
    };
    let controller = registry.controller_for(&block.block_type);
    match event.key {
        Key::Enter => controller.handle_enter(&ctx),
        Key::Backspace => controller.handle_backspace(&ctx),
        Key::Tab => controller.handle_tab(&ctx),
        _ => controller.handle_key_press(&ctx),
    }
}

fn created(registry: &PluginRegistry, block: Block) -> Block {
    registry.controller_for(&block.block_type).on_create(block)
}

fn deleting(registry: &PluginRegistry, block: &Block) {
    registry.controller_for(&block.block_type).on_delete(block);
}

/// Caret after a replacement: same distance from the end of the content.
fn carried_caret(previous: &Block, next: &Block, caret: Option<Caret>) -> CaretPlacement {
    match caret {
        Some(caret) => {
            let tail = previous
                .content
                .chars()
                .count()
                .saturating_sub(caret.start.max(caret.end));
            CaretPlacement::Offset(next.content.chars().count().saturating_sub(tail))
        }
        None => CaretPlacement::End,
    }
}

fn apply_hook_result(
    result: KeyHookResult,
    index: usize,
    caret: Option<Caret>,
    store: &mut BlockStore,
    registry: &PluginRegistry,
) -> KeyOutcome {
    let current = store.blocks()[index].clone();
    match result {
        KeyHookResult::Replace(block) => {
            let focus = FocusTarget {
                block_id: block.id.clone(),
                caret: carried_caret(&current, &block, caret),
            };
            store.dispatch(Action::Transaction(vec![
                Action::ReplaceBlock {
                    id: current.id,
                    with: block,
                },
                Action::SetFocus(Some(focus.block_id.clone())),
            ]));
            KeyOutcome::focused(focus)
        }
        KeyHookResult::Split(blocks) => {
            let mut blocks = blocks.into_iter();
            let Some(head) = blocks.next() else {
                return KeyOutcome::swallowed();
            };
            let mut last = head.id.clone();
            let mut actions = vec![Action::ReplaceBlock {
                id: current.id,
                with: head,
            }];
            for (offset, block) in blocks.enumerate() {
                let block = created(registry, block);
                last = block.id.clone();
                actions.push(Action::AddBlock {
                    block,
                    index: Some(index + 1 + offset),
                });
            }
            actions.push(Action::SetFocus(Some(last.clone())));
            store.dispatch(Action::Transaction(actions));
            KeyOutcome::focused(FocusTarget::start(last))
        }
        KeyHookResult::Composite(CompositeEdit {
            new_blocks,
            updates,
            focus,
        }) => {
            let mut actions: Vec<Action> = updates
                .into_iter()
                .map(|(id, changes)| Action::UpdateBlock { id, changes })
                .collect();
            for (offset, block) in new_blocks.into_iter().enumerate() {
                actions.push(Action::AddBlock {
                    block: created(registry, block),
                    index: Some(index + 1 + offset),
                });
            }
            if let Some(focus) = &focus {
                actions.push(Action::SetFocus(Some(focus.block_id.clone())));
            }
            store.dispatch(Action::Transaction(actions));
            KeyOutcome::Handled { focus }
        }
    }
}

fn run_command(command: Command, store: &mut BlockStore, registry: &PluginRegistry) -> KeyOutcome {
    let focused = store.state().focused_index();
    match command {
        Command::Undo => {
            store.undo();
            KeyOutcome::swallowed()
        }
        Command::Redo => {
            store.redo();
            KeyOutcome::swallowed()
        }
        Command::Duplicate => {
            let Some(index) = focused else {
                return KeyOutcome::Ignored;
            };
            let id = store.blocks()[index].id.clone();
            match store.duplicate_block(&id) {
                Some(copy) => KeyOutcome::focused(FocusTarget::end(copy)),
                None => KeyOutcome::swallowed(),
            }
        }
        Command::Delete => {
            let Some(index) = focused else {
                return KeyOutcome::Ignored;
            };
            let blocks = store.blocks();
            let id = blocks[index].id.clone();
            deleting(registry, &blocks[index]);
            let focus = match index.checked_sub(1) {
                Some(previous) => Some(FocusTarget::end(blocks[previous].id.clone())),
                None => blocks.get(index + 1).map(|b| FocusTarget::start(b.id.clone())),
            };
            store.dispatch(Action::Transaction(vec![
                Action::DeleteBlock(id),
                Action::SetFocus(focus.as_ref().map(|f| f.block_id.clone())),
            ]));
            KeyOutcome::Handled { focus }
        }
        Command::InsertParagraphAfter => match focused {
            Some(index) => insert_paragraph_after(index, store, registry),
            None => KeyOutcome::Ignored,
        },
        Command::Convert(conversion) => {
            let Some(index) = focused else {
                return KeyOutcome::Ignored;
            };
            let block = store.blocks()[index].clone();
            let next = registry.apply_update(&block, &conversion.changes());
            store.update_block(&block.id, BlockChanges::from_block(next));
            KeyOutcome::focused(FocusTarget::end(block.id))
        }
    }
}

fn insert_paragraph_after(
    index: usize,
    store: &mut BlockStore,
    registry: &PluginRegistry,
) -> KeyOutcome {
    let block = created(registry, empty_paragraph());
    let id = block.id.clone();
    store.dispatch(Action::Transaction(vec![
        Action::AddBlock {
            block,
            index: Some(index + 1),
        },
        Action::SetFocus(Some(id.clone())),
    ]));
    KeyOutcome::focused(FocusTarget::start(id))
}

/// Delete an empty block, or merge into the previous block from offset 0.
fn backspace(
    index: usize,
    caret: Option<Caret>,
    store: &mut BlockStore,
    registry: &PluginRegistry,
) -> KeyOutcome {
    let Some(previous) = index.checked_sub(1).map(|i| store.blocks()[i].clone()) else {
        return KeyOutcome::Ignored;
    };
    let current = store.blocks()[index].clone();

    if current.content.is_empty() {
        deleting(registry, &current);
        let focus = FocusTarget::end(previous.id.clone());
        store.dispatch(Action::Transaction(vec![
            Action::DeleteBlock(current.id),
            Action::SetFocus(Some(previous.id)),
        ]));
        return KeyOutcome::focused(focus);
    }

    if !caret.is_some_and(|caret| caret.is_at_start()) {
        return KeyOutcome::Ignored;
    }

    if previous.is(types::DIVIDER) {
        deleting(registry, &previous);
        store.dispatch(Action::DeleteBlock(previous.id));
        return KeyOutcome::focused(FocusTarget::start(current.id));
    }

    // The absorbed block is gone once its content moves up.
    deleting(registry, &current);
    let join_at = previous.content.chars().count();
    let merged = format!("{}{}", previous.content, current.content);
    store.dispatch(Action::Transaction(vec![
        Action::UpdateBlock {
            id: previous.id.clone(),
            changes: BlockChanges::content(merged),
        },
        Action::DeleteBlock(current.id),
        Action::SetFocus(Some(previous.id.clone())),
    ]));
    KeyOutcome::focused(FocusTarget {
        block_id: previous.id,
        caret: CaretPlacement::Offset(join_at),
    })
}

fn caret_on_first_line(content: &str, caret: Option<Caret>) -> bool {
    caret.is_none_or(|caret| !content.chars().take(caret.start.min(caret.end)).any(|c| c == '\n'))
}

fn caret_on_last_line(content: &str, caret: Option<Caret>) -> bool {
    caret.is_none_or(|caret| !content.chars().skip(caret.start.max(caret.end)).any(|c| c == '\n'))
}

fn move_focus(target: Option<usize>, store: &mut BlockStore) -> KeyOutcome {
    let Some(block) = target.and_then(|index| store.blocks().get(index)) else {
        return KeyOutcome::Ignored;
    };
    let id = block.id.clone();
    store.set_focus(Some(id.clone()));
    KeyOutcome::focused(FocusTarget::end(id))
}
