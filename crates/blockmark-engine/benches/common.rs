// Shared by the bench targets in this directory; each one only uses part of it.
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **bold** content.\n\n- Bullet point\n  - Nested item\n- [x] Done item\n\n> [!NOTE] Remember\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n---\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_paragraphs(count: usize) -> Vec<blockmark_engine::Block> {
    (0..count)
        .map(|i| blockmark_engine::Block::paragraph(format!("Paragraph {i}")))
        .collect()
}
