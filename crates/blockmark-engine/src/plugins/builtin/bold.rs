//! `**strong**` inline emphasis. Contributes no block syntax.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Block;
use crate::plugins::{
    MarkdownParser, MarkdownPlugin, MarkdownSerializer, MarkdownSyntax, SyntaxPatterns,
};

use super::manifest;

pub const PRIORITY: i32 = 10;

fn bold_regex() -> &'static Regex {
    static BOLD_REGEX: OnceLock<Regex> = OnceLock::new();
    BOLD_REGEX.get_or_init(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("Invalid bold regex"))
}

fn strong_regex() -> &'static Regex {
    static STRONG_REGEX: OnceLock<Regex> = OnceLock::new();
    STRONG_REGEX
        .get_or_init(|| Regex::new(r"<strong>(.*?)</strong>").expect("Invalid strong regex"))
}

pub struct BoldSyntax;

impl MarkdownParser for BoldSyntax {
    fn can_parse(&self, _line: &str) -> bool {
        false
    }

    fn parse_block(&self, _line: &str) -> Option<Block> {
        None
    }

    fn parse_inline(&self, text: &str) -> Option<String> {
        bold_regex()
            .is_match(text)
            .then(|| bold_regex().replace_all(text, "<strong>$1</strong>").into_owned())
    }
}

impl MarkdownSerializer for BoldSyntax {
    fn can_serialize(&self, _block: &Block) -> bool {
        false
    }

    fn serialize_block(&self, _block: &Block) -> Option<String> {
        None
    }

    fn serialize_inline(&self, markup: &str) -> Option<String> {
        strong_regex()
            .is_match(markup)
            .then(|| strong_regex().replace_all(markup, "**$1**").into_owned())
    }
}

pub fn markdown_plugin() -> MarkdownPlugin {
    MarkdownPlugin::new(
        manifest("core.bold", "Bold"),
        MarkdownSyntax {
            patterns: SyntaxPatterns {
                inline: Some(bold_regex().clone()),
                block: None,
            },
            priority: PRIORITY,
        },
        BoldSyntax,
        BoldSyntax,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_and_unwraps_strong() {
        let markup = BoldSyntax.parse_inline("a **big** deal").unwrap();
        assert_eq!(markup, "a <strong>big</strong> deal");
        assert_eq!(
            BoldSyntax.serialize_inline(&markup).as_deref(),
            Some("a **big** deal")
        );
    }

    #[test]
    fn unmatched_markers_are_left_alone() {
        assert!(BoldSyntax.parse_inline("a **dangling").is_none());
    }
}
