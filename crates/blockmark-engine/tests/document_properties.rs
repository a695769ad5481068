use std::rc::Rc;
use std::time::Duration;

use blockmark_engine::models::{ListType, types};
use blockmark_engine::{
    Block, BlockChanges, BlockStore, Editor, EditorOptions, ManualClock, PluginRegistry,
    RenderTarget, Transpiler,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// Block shape without ids, for comparing documents parsed twice.
fn shape(blocks: &[Block]) -> Vec<(String, String, String)> {
    blocks
        .iter()
        .map(|b| {
            (
                b.block_type.clone(),
                b.content.clone(),
                serde_json::Value::Object(b.meta.clone()).to_string(),
            )
        })
        .collect()
}

#[test]
fn canonical_fixture_round_trips_exactly() {
    let registry = PluginRegistry::with_builtins();
    let transpiler = Transpiler::new(&registry);
    let md = fixture("canonical");

    let report = transpiler.parse_with_report(&md);
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.blocks.len(), 14);
    assert_eq!(transpiler.serialize(&report.blocks), md.trim_end());
}

#[rstest]
#[case("# Title\n\nBody")]
#[case("- one\n\n  - two\n\n    - three")]
#[case("1. first\n\n1. second")]
#[case("- [ ] open\n\n- [x] done")]
#[case("```\n```")]
#[case("~~~\n```\n~~~")]
#[case("> [!NOTE]")]
#[case("***")]
#[case("![video](https://example.com/v.mp4)")]
fn canonical_snippets_round_trip(#[case] md: &str) {
    let registry = PluginRegistry::with_builtins();
    let transpiler = Transpiler::new(&registry);
    assert_eq!(transpiler.serialize(&transpiler.parse(md)), md);
}

#[rstest]
#[case("#   Loose   heading")]
#[case("* star bullet\n+ plus bullet\n3. numbered")]
#[case("para\n\n\n\nafter gap")]
#[case("```js\n\n\ncode\n\n```")]
#[case("- [X] shouting")]
fn serialization_is_stable_after_one_pass(#[case] md: &str) {
    let registry = PluginRegistry::with_builtins();
    let transpiler = Transpiler::new(&registry);

    let first = transpiler.parse(md);
    let normalized = transpiler.serialize(&first);
    let second = transpiler.parse(&normalized);

    assert_eq!(shape(&first), shape(&second));
    assert_eq!(transpiler.serialize(&second), normalized);
}

#[test]
fn built_blocks_survive_serialize_then_parse() {
    let registry = PluginRegistry::with_builtins();
    let transpiler = Transpiler::new(&registry);
    let blocks = vec![
        Block::heading(3, "Heading"),
        Block::paragraph("two\nlines"),
        Block::quote("quoted"),
        Block::list(ListType::Ordered, 0, "first"),
        Block::list(ListType::Unordered, 2, "deep"),
        Block::checklist(true, 1, "done"),
        Block::code("python", "print(1)\n\n    print(2)"),
        Block::code("", "```\ninner"),
        Block::divider(),
        Block::new(types::CALLOUT, "Careful").with_meta("calloutType", "WARNING"),
        Block::new(types::VIDEO, "https://example.com/v.mp4").with_meta("title", "Clip"),
    ];

    let reparsed = transpiler.parse(&transpiler.serialize(&blocks));
    assert_eq!(shape(&reparsed), shape(&blocks));
}

#[rstest]
#[case(Block::paragraph("# x"), "heading", "x")]
#[case(Block::paragraph("---"), "divider", "")]
#[case(Block::paragraph("- listed"), "list", "listed")]
#[case(Block::list(ListType::Unordered, 0, "[ ] task"), "checklist", "task")]
#[case(Block::quote("[!NOTE] heads up"), "callout", "heads up")]
#[case(Block::code("", "\n\nbody\n"), "code", "body")]
fn markdown_looking_content_normalizes_once(
    #[case] block: Block,
    #[case] block_type: &str,
    #[case] content: &str,
) {
    let registry = PluginRegistry::with_builtins();
    let transpiler = Transpiler::new(&registry);

    let first = transpiler.parse(&transpiler.serialize(&[block]));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].block_type, block_type);
    assert_eq!(first[0].content, content);

    let second = transpiler.parse(&transpiler.serialize(&first));
    assert_eq!(shape(&second), shape(&first));
}

fn store_with(blocks: Vec<Block>) -> (BlockStore, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let store = BlockStore::with_options(blocks, EditorOptions::default(), clock.clone());
    (store, clock)
}

#[test]
fn undo_then_redo_restores_every_intermediate_state() {
    let (mut store, clock) = store_with(vec![Block::paragraph("a"), Block::paragraph("b")]);
    let a = store.blocks()[0].id.clone();
    let b = store.blocks()[1].id.clone();

    let mut states = vec![store.blocks().to_vec()];
    store.update_block(&a, BlockChanges::content("a1"));
    states.push(store.blocks().to_vec());
    clock.advance(Duration::from_secs(1));
    store.move_block(&b, 0);
    states.push(store.blocks().to_vec());
    let copy = store.duplicate_block(&a).unwrap();
    states.push(store.blocks().to_vec());
    store.delete_block(&copy);
    states.push(store.blocks().to_vec());
    store.add_block(Block::heading(2, "end"), None);
    states.push(store.blocks().to_vec());

    for expected in states.iter().rev().skip(1) {
        assert!(store.undo());
        assert_eq!(store.blocks(), expected.as_slice());
    }
    assert!(!store.can_undo());

    for expected in states.iter().skip(1) {
        assert!(store.redo());
        assert_eq!(store.blocks(), expected.as_slice());
    }
    assert!(!store.can_redo());
}

#[test]
fn moves_preserve_the_block_multiset() {
    let blocks: Vec<Block> = (0..6).map(|i| Block::paragraph(format!("p{i}"))).collect();
    let ids: Vec<_> = blocks.iter().map(|b| b.id.clone()).collect();
    let (mut store, _clock) = store_with(blocks);

    for (step, id) in ids.iter().cycle().take(20).enumerate() {
        let target = (step * 7) % 9;
        store.move_block(id, target);
        assert_eq!(store.blocks().len(), 6);
        assert_eq!(&store.blocks()[target.min(5)].id, id);

        let mut contents: Vec<_> = store.blocks().iter().map(|b| b.content.clone()).collect();
        contents.sort();
        assert_eq!(contents, vec!["p0", "p1", "p2", "p3", "p4", "p5"]);

        let mut current: Vec<_> = store.blocks().iter().map(|b| b.id.clone()).collect();
        let mut original = ids.clone();
        current.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        original.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(current, original);
    }
}

#[test]
fn unknown_block_types_survive_every_surface() {
    let mermaid = Block::new("mermaid", "graph TD").with_meta("theme", "dark");
    let mut editor = Editor::new(
        vec![Block::paragraph("before"), mermaid.clone()],
        EditorOptions::default(),
    );

    let plan = editor.render_plan();
    assert!(matches!(plan[1].target, RenderTarget::Placeholder(_)));
    assert_eq!(editor.markdown(), "before\n\ngraph TD");

    let json = editor.to_json().unwrap();
    let mut reloaded = Editor::new(vec![], EditorOptions::default());
    reloaded.load_json(&json).unwrap();
    assert_eq!(reloaded.blocks()[1], mermaid);

    assert!(editor.update_block(&mermaid.id, BlockChanges::content("graph LR")));
    assert_eq!(editor.blocks()[1].block_type, "mermaid");
    assert!(editor.delete_block(&mermaid.id));
    assert!(editor.undo());
    assert_eq!(editor.blocks()[1].content, "graph LR");
    assert_eq!(editor.blocks()[1].meta_str("theme"), Some("dark"));
}

#[test]
fn editor_document_lifecycle() {
    let mut editor = Editor::from_markdown("# Notes\n\n- item", EditorOptions::default());
    assert_eq!(editor.blocks().len(), 2);

    let id = editor
        .insert_block(Block::paragraph(""), Some(2))
        .unwrap();
    editor.update_content(&id, "- [ ] new task");
    assert_eq!(editor.blocks()[2].block_type, types::CHECKLIST);

    assert_eq!(editor.markdown(), "# Notes\n\n- item\n\n- [ ] new task");
    assert!(editor.validate().is_empty());
}
