//! Built-in line rules, consulted after every markdown plugin declined.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::{Block, ListType, types};

use super::fence::CodeFence;

fn heading_regex() -> &'static Regex {
    static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADING_REGEX.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("Invalid heading regex"))
}

fn quote_regex() -> &'static Regex {
    static QUOTE_REGEX: OnceLock<Regex> = OnceLock::new();
    QUOTE_REGEX.get_or_init(|| Regex::new(r"^>\s+(.*)$").expect("Invalid quote regex"))
}

fn checklist_regex() -> &'static Regex {
    static CHECKLIST_REGEX: OnceLock<Regex> = OnceLock::new();
    CHECKLIST_REGEX.get_or_init(|| {
        Regex::new(r"^(\s*)[-*+]\s+\[([ xX])\](?:\s+(.*))?$").expect("Invalid checklist regex")
    })
}

fn list_regex() -> &'static Regex {
    static LIST_REGEX: OnceLock<Regex> = OnceLock::new();
    LIST_REGEX.get_or_init(|| {
        Regex::new(r"^(\s*)([-*+]|\d+\.)\s+(.*)$").expect("Invalid list regex")
    })
}

pub(crate) fn divider_regex() -> &'static Regex {
    static DIVIDER_REGEX: OnceLock<Regex> = OnceLock::new();
    DIVIDER_REGEX
        .get_or_init(|| Regex::new(r"^(---|\*\*\*|___)\s*$").expect("Invalid divider regex"))
}

/// Nesting level of an indentation prefix: two columns per level, a tab counting as two.
pub(crate) fn indent_level(indent: &str) -> u64 {
    let columns: usize = indent
        .chars()
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum();
    (columns / 2) as u64
}

fn group<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map(|m| m.as_str()).unwrap_or("")
}

/// Classify a non-blank line outside a fence. `None` means paragraph text.
pub(crate) fn parse_line(line: &str) -> Option<Block> {
    if let Some(c) = heading_regex().captures(line) {
        return Some(Block::heading(group(&c, 1).len() as u8, group(&c, 2)));
    }
    if let Some(c) = quote_regex().captures(line) {
        return Some(Block::quote(group(&c, 1)));
    }
    if let Some(c) = checklist_regex().captures(line) {
        let checked = group(&c, 2).eq_ignore_ascii_case("x");
        return Some(Block::checklist(
            checked,
            indent_level(group(&c, 1)),
            group(&c, 3),
        ));
    }
    if let Some(c) = list_regex().captures(line) {
        let list_type = if group(&c, 2).ends_with('.') {
            ListType::Ordered
        } else {
            ListType::Unordered
        };
        return Some(Block::list(
            list_type,
            indent_level(group(&c, 1)),
            group(&c, 3),
        ));
    }
    if let Some(c) = divider_regex().captures(line) {
        return Some(Block::divider().with_meta("style", group(&c, 1)));
    }
    None
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

/// Built-in markdown for a block no plugin serialized.
pub(crate) fn serialize_block(block: &Block) -> String {
    match block.block_type.as_str() {
        types::HEADING => format!("{} {}", "#".repeat(block.heading_level()), block.content),
        types::QUOTE => block
            .content
            .split('\n')
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        types::CODE => {
            let fence = CodeFence::for_content(&block.content).marker();
            let language = block.meta_str("language").unwrap_or("");
            if block.content.is_empty() {
                format!("{fence}{language}\n{fence}")
            } else {
                format!("{fence}{language}\n{}\n{fence}", block.content)
            }
        }
        types::LIST => {
            let marker = match block.list_type() {
                ListType::Ordered => "1.",
                ListType::Unordered => "-",
            };
            format!("{}{marker} {}", indent(block.level()), block.content)
        }
        types::CHECKLIST => {
            let mark = if block.meta_bool("checked").unwrap_or(false) {
                'x'
            } else {
                ' '
            };
            format!("{}- [{mark}] {}", indent(block.level()), block.content)
        }
        types::DIVIDER => block
            .meta_str("style")
            .filter(|style| divider_regex().is_match(style))
            .unwrap_or("---")
            .to_string(),
        _ => block.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("# Title", "heading", "Title", json!({"level": 1}))]
    #[case("###### Deep", "heading", "Deep", json!({"level": 6}))]
    #[case("> said", "quote", "said", json!({}))]
    #[case("- [ ] todo", "checklist", "todo", json!({"checked": false, "level": 0}))]
    #[case("    - [X] done", "checklist", "done", json!({"checked": true, "level": 2}))]
    #[case("- item", "list", "item", json!({"listType": "unordered", "level": 0}))]
    #[case("  * star", "list", "star", json!({"listType": "unordered", "level": 1}))]
    #[case("12. twelve", "list", "twelve", json!({"listType": "ordered", "level": 0}))]
    #[case("***", "divider", "", json!({"style": "***"}))]
    #[case("___  ", "divider", "", json!({"style": "___"}))]
    fn classifies_builtin_lines(
        #[case] line: &str,
        #[case] block_type: &str,
        #[case] content: &str,
        #[case] meta: serde_json::Value,
    ) {
        let block = parse_line(line).expect("line should be claimed");
        assert_eq!(block.block_type, block_type);
        assert_eq!(block.content, content);
        assert_eq!(serde_json::Value::Object(block.meta), meta);
    }

    #[rstest]
    #[case("plain words")]
    #[case("####### seven hashes")]
    #[case(">no space")]
    #[case("-not a list")]
    #[case("--- trailing text")]
    fn leaves_paragraph_text_alone(#[case] line: &str) {
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn tab_indent_counts_as_one_level() {
        assert_eq!(indent_level("\t"), 1);
        assert_eq!(indent_level("   "), 1);
        assert_eq!(indent_level(""), 0);
    }

    #[test]
    fn serializes_nested_checklist() {
        let block = Block::checklist(true, 2, "ship it");
        assert_eq!(serialize_block(&block), "    - [x] ship it");
    }

    #[test]
    fn unknown_divider_style_falls_back() {
        let block = Block::new(types::DIVIDER, "").with_meta("style", "===");
        assert_eq!(serialize_block(&block), "---");
    }

    #[test]
    fn unknown_type_serializes_raw_content() {
        let block = Block::new("mystery", "keep me");
        assert_eq!(serialize_block(&block), "keep me");
    }
}
