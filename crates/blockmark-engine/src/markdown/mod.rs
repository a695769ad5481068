//! # Markdown Transpiler
//!
//! Bidirectional mapping between markdown text and the flat block sequence.
//!
//! ## Parsing
//!
//! Input is scanned line by line by a [`LineParser`] that holds at most one open leaf:
//! a paragraph accumulator or a code fence. For every line outside a fence, markdown
//! plugins get first refusal in priority order; the built-in [`rules`] apply only when
//! every plugin declined. Fenced lines are raw: they are captured verbatim and never
//! matched against any rule.
//!
//! Parsing never fails. Recoverable problems (an unterminated fence, a plugin that
//! claimed a line but produced nothing) are reported as [`EditorError::Parse`]
//! diagnostics next to the blocks.
//!
//! ## Serialization
//!
//! Each block is offered to the markdown plugins in the same priority order; the first
//! `Some` wins, otherwise the built-in rendering applies. Blocks are joined by a blank
//! line, so `parse(serialize(blocks))` reproduces type, content and meta of every
//! built-in block whose content does not itself read as block markdown.
//!
//! Content is never escaped. A paragraph line such as `# x` or `---` comes back as a
//! heading or divider, list content starting with `[ ] ` comes back as a checklist,
//! quote content starting with `[!NOTE]` comes back as a callout, and code loses blank
//! lines at either end. Each of these is stable after one more pass.

pub mod fence;
pub(crate) mod rules;

use crate::error::EditorError;
use crate::models::{Block, BlockId};
use crate::plugins::{MarkdownPlugin, PluginRegistry};

use fence::{CodeFence, FenceKind};

/// Blocks parsed from markdown plus the problems recovered along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub blocks: Vec<Block>,
    pub diagnostics: Vec<EditorError>,
}

#[derive(Debug)]
enum LeafState {
    None,
    Paragraph {
        lines: Vec<String>,
    },
    Fence {
        kind: FenceKind,
        language: String,
        opened_at: usize,
        lines: Vec<String>,
    },
}

/// One-pass line state machine producing blocks.
struct LineParser<'r> {
    plugins: Vec<&'r MarkdownPlugin>,
    leaf: LeafState,
    out: Vec<Block>,
    diagnostics: Vec<EditorError>,
}

impl<'r> LineParser<'r> {
    fn new(registry: &'r PluginRegistry) -> Self {
        Self {
            plugins: registry.markdown_plugins().collect(),
            leaf: LeafState::None,
            out: vec![],
            diagnostics: vec![],
        }
    }

    fn push(&mut self, number: usize, line: &str) {
        if let LeafState::Fence { kind, .. } = self.leaf {
            if CodeFence::closes(kind, line) {
                self.flush_fence();
            } else if let LeafState::Fence { lines, .. } = &mut self.leaf {
                lines.push(line.to_string());
            }
            return;
        }

        if let Some(kind) = CodeFence::sig(line) {
            self.flush_paragraph();
            self.leaf = LeafState::Fence {
                kind,
                language: CodeFence::language(line, kind),
                opened_at: number,
                lines: vec![],
            };
            return;
        }

        if line.trim().is_empty() {
            self.flush_paragraph();
            return;
        }

        if let Some(block) = self.offer_to_plugins(number, line) {
            self.emit(block);
            return;
        }

        if let Some(block) = rules::parse_line(line) {
            self.flush_paragraph();
            self.emit(block);
            return;
        }

        self.extend_paragraph(line);
    }

    fn finish(mut self) -> ParseReport {
        // EOF flush
        self.flush_paragraph();
        if let LeafState::Fence { opened_at, .. } = self.leaf {
            let diagnostic = EditorError::Parse {
                line: opened_at,
                message: "code fence is never closed; closed at end of input".to_string(),
            };
            log::warn!("{diagnostic}");
            self.diagnostics.push(diagnostic);
            self.flush_fence();
        }
        ParseReport {
            blocks: self.out,
            diagnostics: self.diagnostics,
        }
    }

    fn offer_to_plugins(&mut self, number: usize, line: &str) -> Option<Block> {
        let plugins = self.plugins.clone();
        for plugin in plugins {
            let Some(parser) = plugin.parser.as_deref() else {
                continue;
            };
            if let Some(pattern) = &plugin.syntax.patterns.block
                && !pattern.is_match(line.trim())
            {
                continue;
            }
            if !parser.can_parse(line) {
                continue;
            }
            self.flush_paragraph();
            match parser.parse_block(line) {
                Some(block) => return Some(block),
                None => {
                    let diagnostic = EditorError::Parse {
                        line: number,
                        message: format!(
                            "plugin '{}' claimed the line but produced no block",
                            plugin.manifest.id
                        ),
                    };
                    log::warn!("{diagnostic}");
                    self.diagnostics.push(diagnostic);
                }
            }
        }
        None
    }

    fn emit(&mut self, mut block: Block) {
        block.id = BlockId::generate();
        self.out.push(block);
    }

    fn extend_paragraph(&mut self, line: &str) {
        match &mut self.leaf {
            LeafState::Paragraph { lines } => lines.push(line.to_string()),
            _ => {
                self.leaf = LeafState::Paragraph {
                    lines: vec![line.to_string()],
                }
            }
        }
    }

    fn flush_paragraph(&mut self) {
        let prev = std::mem::replace(&mut self.leaf, LeafState::None);
        if let LeafState::Paragraph { lines } = prev {
            self.emit(Block::paragraph(lines.join("\n")));
        } else {
            self.leaf = prev; // put back non-paragraph leaf (e.g. fence)
        }
    }

    fn flush_fence(&mut self) {
        let prev = std::mem::replace(&mut self.leaf, LeafState::None);
        if let LeafState::Fence {
            language, lines, ..
        } = prev
        {
            self.emit(Block::code(language, trim_code(&lines)));
        } else {
            self.leaf = prev;
        }
    }
}

/// Drop blank lines around the captured code and trailing whitespace, keeping the
/// first line's indentation.
fn trim_code(lines: &[String]) -> String {
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n").trim_end().to_string(),
        _ => String::new(),
    }
}

/// Transpiler bound to the plugin set it consults.
#[derive(Clone, Copy)]
pub struct Transpiler<'r> {
    registry: &'r PluginRegistry,
}

impl<'r> Transpiler<'r> {
    pub fn new(registry: &'r PluginRegistry) -> Self {
        Self { registry }
    }

    pub fn parse(&self, text: &str) -> Vec<Block> {
        self.parse_with_report(text).blocks
    }

    pub fn parse_with_report(&self, text: &str) -> ParseReport {
        let mut parser = LineParser::new(self.registry);
        for (index, line) in text.lines().enumerate() {
            parser.push(index + 1, line);
        }
        parser.finish()
    }

    pub fn serialize(&self, blocks: &[Block]) -> String {
        blocks
            .iter()
            .map(|block| self.serialize_block(block))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn serialize_block(&self, block: &Block) -> String {
        self.registry
            .markdown_plugins()
            .filter_map(|plugin| plugin.serializer.as_deref())
            .filter(|serializer| serializer.can_serialize(block))
            .find_map(|serializer| serializer.serialize_block(block))
            .unwrap_or_else(|| rules::serialize_block(block))
    }

    /// Html-escape `text` and apply every plugin's inline rule, highest priority first.
    pub fn render_inline(&self, text: &str) -> String {
        let mut markup = html_escape::encode_text(text).into_owned();
        for plugin in self.registry.markdown_plugins() {
            if let Some(pattern) = &plugin.syntax.patterns.inline
                && !pattern.is_match(&markup)
            {
                continue;
            }
            if let Some(parser) = plugin.parser.as_deref()
                && let Some(next) = parser.parse_inline(&markup)
            {
                markup = next;
            }
        }
        markup
    }

    /// Inverse of [`Transpiler::render_inline`]: undo inline rules in reverse
    /// priority order, then unescape.
    pub fn serialize_inline(&self, markup: &str) -> String {
        let mut text = markup.to_string();
        for plugin in self.registry.markdown_plugins().rev() {
            if let Some(serializer) = plugin.serializer.as_deref()
                && let Some(next) = serializer.serialize_inline(&text)
            {
                text = next;
            }
        }
        html_escape::decode_html_entities(&text).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types;
    use pretty_assertions::assert_eq;

    fn kinds(blocks: &[Block]) -> Vec<(&str, &str)> {
        blocks
            .iter()
            .map(|b| (b.block_type.as_str(), b.content.as_str()))
            .collect()
    }

    #[test]
    fn empty_document() {
        let registry = PluginRegistry::new();
        assert!(Transpiler::new(&registry).parse("").is_empty());
    }

    #[test]
    fn blank_lines_only() {
        let registry = PluginRegistry::new();
        assert!(Transpiler::new(&registry).parse("\n\n\n").is_empty());
    }

    #[test]
    fn paragraph_lines_accumulate_until_blank() {
        let registry = PluginRegistry::new();
        let blocks = Transpiler::new(&registry).parse("one\ntwo\n\nthree");
        assert_eq!(
            kinds(&blocks),
            vec![("paragraph", "one\ntwo"), ("paragraph", "three")]
        );
    }

    #[test]
    fn structural_line_flushes_paragraph() {
        let registry = PluginRegistry::new();
        let blocks = Transpiler::new(&registry).parse("intro\n# Head\n- item");
        assert_eq!(
            kinds(&blocks),
            vec![("paragraph", "intro"), ("heading", "Head"), ("list", "item")]
        );
    }

    #[test]
    fn fence_contents_are_raw() {
        let registry = PluginRegistry::with_builtins();
        let md = "text\n```rust\n# not a heading\n- not a list\n```\nafter";
        let blocks = Transpiler::new(&registry).parse(md);
        assert_eq!(
            kinds(&blocks),
            vec![
                ("paragraph", "text"),
                ("code", "# not a heading\n- not a list"),
                ("paragraph", "after")
            ]
        );
        assert_eq!(blocks[1].meta_str("language"), Some("rust"));
    }

    #[test]
    fn tilde_fence_is_not_closed_by_backticks() {
        let registry = PluginRegistry::new();
        let blocks = Transpiler::new(&registry).parse("~~~\n```\ninner\n```\n~~~");
        assert_eq!(kinds(&blocks), vec![("code", "```\ninner\n```")]);
        assert_eq!(blocks[0].meta_str("language"), Some(""));
    }

    #[test]
    fn unterminated_fence_is_recovered() {
        let registry = PluginRegistry::new();
        let report = Transpiler::new(&registry).parse_with_report("para\n\n```py\nprint(1)\n");
        assert_eq!(
            kinds(&report.blocks),
            vec![("paragraph", "para"), ("code", "print(1)")]
        );
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(
            report.diagnostics[0],
            EditorError::Parse { line: 3, .. }
        ));
    }

    #[test]
    fn every_block_gets_a_fresh_id() {
        let registry = PluginRegistry::new();
        let blocks = Transpiler::new(&registry).parse("a\n\nb\n\n# c\n\n---");
        let mut ids: Vec<_> = blocks.iter().map(|b| b.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), blocks.len());
    }

    #[test]
    fn callout_plugin_beats_quote_rule() {
        let registry = PluginRegistry::with_builtins();
        let blocks = Transpiler::new(&registry).parse("> [!NOTE] Heads up\n> plain quote");
        assert_eq!(
            kinds(&blocks),
            vec![("callout", "Heads up"), ("quote", "plain quote")]
        );
    }

    #[test]
    fn serialize_joins_with_blank_line() {
        let registry = PluginRegistry::with_builtins();
        let blocks = vec![
            Block::heading(2, "Section"),
            Block::paragraph("Body"),
            Block::code("rust", "fn main() {}"),
            Block::divider(),
        ];
        let md = Transpiler::new(&registry).serialize(&blocks);
        insta::assert_snapshot!(md, @r"
        ## Section

        Body

        ```rust
        fn main() {}
        ```

        ---
        ");
    }

    #[test]
    fn empty_paragraphs_are_not_serialized() {
        let registry = PluginRegistry::new();
        let blocks = vec![
            Block::paragraph("a"),
            Block::paragraph(""),
            Block::paragraph("b"),
        ];
        assert_eq!(Transpiler::new(&registry).serialize(&blocks), "a\n\nb");
    }

    #[test]
    fn inline_round_trip_escapes_html() {
        let registry = PluginRegistry::with_builtins();
        let transpiler = Transpiler::new(&registry);
        let markup = transpiler.render_inline("1 < 2 and **bold**");
        assert_eq!(markup, "1 &lt; 2 and <strong>bold</strong>");
        assert_eq!(transpiler.serialize_inline(&markup), "1 < 2 and **bold**");
    }

    #[test]
    fn video_block_round_trips_through_plugin() {
        let registry = PluginRegistry::with_builtins();
        let transpiler = Transpiler::new(&registry);
        let blocks = transpiler.parse(r#"![video](https://v.example/x.mp4 "Intro")"#);
        assert_eq!(blocks[0].block_type, types::VIDEO);
        assert_eq!(
            transpiler.serialize(&blocks),
            r#"![video](https://v.example/x.mp4 "Intro")"#
        );
    }
}
