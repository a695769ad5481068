use std::time::{Duration, Instant};

use crate::models::{Block, BlockChanges, ListType, types};

use super::keys::{Key, KeyEvent};

/// Block type a conversion shortcut turns the focused block into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Paragraph,
    Heading(u8),
    Quote,
    List(ListType),
    Checklist,
    Code,
}

impl Conversion {
    /// Conversion producing `block_type` with default attributes.
    pub fn for_type(block_type: &str) -> Option<Self> {
        match block_type {
            types::PARAGRAPH => Some(Conversion::Paragraph),
            types::HEADING => Some(Conversion::Heading(1)),
            types::QUOTE => Some(Conversion::Quote),
            types::LIST => Some(Conversion::List(ListType::Unordered)),
            types::CHECKLIST => Some(Conversion::Checklist),
            types::CODE => Some(Conversion::Code),
            _ => None,
        }
    }

    fn template(self) -> Block {
        match self {
            Conversion::Paragraph => Block::paragraph(""),
            Conversion::Heading(level) => Block::heading(level, ""),
            Conversion::Quote => Block::quote(""),
            Conversion::List(list_type) => Block::list(list_type, 0, ""),
            Conversion::Checklist => Block::checklist(false, 0, ""),
            Conversion::Code => Block::code("", ""),
        }
    }

    pub fn block_type(self) -> &'static str {
        match self {
            Conversion::Paragraph => types::PARAGRAPH,
            Conversion::Heading(_) => types::HEADING,
            Conversion::Quote => types::QUOTE,
            Conversion::List(_) => types::LIST,
            Conversion::Checklist => types::CHECKLIST,
            Conversion::Code => types::CODE,
        }
    }

    /// New type with its canonical meta; the content is kept.
    pub fn changes(self) -> BlockChanges {
        BlockChanges::retype(self.block_type(), self.template().meta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    Duplicate,
    Delete,
    InsertParagraphAfter,
    Convert(Conversion),
}

/// Primary modifier (Ctrl or Cmd) plus a key, with optional Shift and Alt.
///
/// Character keys match case-insensitively; hosts report the unshifted key
/// (`Char('8')`, not `Char('*')`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub key: Key,
    pub shift: bool,
    pub alt: bool,
}

fn normalize(key: Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

impl Shortcut {
    pub fn primary(key: Key) -> Self {
        Self {
            key: normalize(key),
            shift: false,
            alt: false,
        }
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.modifiers.has_primary()
            && event.modifiers.shift == self.shift
            && event.modifiers.alt == self.alt
            && normalize(event.key) == self.key
    }
}

/// Global shortcuts, consulted before any block hook.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutTable {
    bindings: Vec<(Shortcut, Command)>,
}

impl Default for ShortcutTable {
    fn default() -> Self {
        let c = |ch| Shortcut::primary(Key::Char(ch));
        Self {
            bindings: vec![
                (c('z'), Command::Undo),
                (c('z').shift(), Command::Redo),
                (c('y'), Command::Redo),
                (c('d'), Command::Duplicate),
                (c('k').shift(), Command::Delete),
                (
                    Shortcut::primary(Key::Enter),
                    Command::InsertParagraphAfter,
                ),
                (c('0').alt(), Command::Convert(Conversion::Paragraph)),
                (c('1').alt(), Command::Convert(Conversion::Heading(1))),
                (c('2').alt(), Command::Convert(Conversion::Heading(2))),
                (c('3').alt(), Command::Convert(Conversion::Heading(3))),
                (
                    c('7').shift(),
                    Command::Convert(Conversion::List(ListType::Ordered)),
                ),
                (
                    c('8').shift(),
                    Command::Convert(Conversion::List(ListType::Unordered)),
                ),
                (c('9').shift(), Command::Convert(Conversion::Checklist)),
                (c('c').alt(), Command::Convert(Conversion::Code)),
                (c('q').alt(), Command::Convert(Conversion::Quote)),
            ],
        }
    }
}

impl ShortcutTable {
    pub fn empty() -> Self {
        Self { bindings: vec![] }
    }

    /// Bind `shortcut`, replacing its previous command. Returns the replaced one.
    pub fn bind(&mut self, shortcut: Shortcut, command: Command) -> Option<Command> {
        match self.bindings.iter_mut().find(|(s, _)| *s == shortcut) {
            Some((_, bound)) => Some(std::mem::replace(bound, command)),
            None => {
                self.bindings.push((shortcut, command));
                None
            }
        }
    }

    pub fn unbind(&mut self, shortcut: &Shortcut) -> Option<Command> {
        let index = self.bindings.iter().position(|(s, _)| s == shortcut)?;
        Some(self.bindings.remove(index).1)
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<(Shortcut, Command)> {
        self.bindings
            .iter()
            .find(|(shortcut, _)| shortcut.matches(event))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Shortcut, Command)> {
        self.bindings.iter()
    }
}

/// Suppresses repeats of the same shortcut fired faster than `min_interval`.
#[derive(Debug, Clone)]
pub struct RepeatGuard {
    min_interval: Duration,
    last: Option<(Shortcut, Instant)>,
}

impl RepeatGuard {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Whether `shortcut` may fire at `now`. Admitted firings restart the interval.
    pub fn admit(&mut self, shortcut: Shortcut, now: Instant) -> bool {
        if let Some((last, at)) = self.last
            && last == shortcut
            && now.saturating_duration_since(at) < self.min_interval
        {
            return false;
        }
        self.last = Some((shortcut, now));
        true
    }
}
