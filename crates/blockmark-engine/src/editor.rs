//! Host-facing facade tying the store, registry, transpiler, key router and
//! reorder engine together.

use std::rc::Rc;

use crate::clock::{Clock, SystemClock};
use crate::editing::keyboard::{Caret, Conversion, KeyEvent};
use crate::editing::{
    Action, BlockLayout, BlockStore, DropOutcome, EditorState, KeyOutcome, KeyboardRouter,
    ReorderEngine,
};
use crate::error::{EditorError, PluginError};
use crate::io::{self, IoError};
use crate::markdown::Transpiler;
use crate::models::{Block, BlockChanges, BlockId, Meta, types};
use crate::options::EditorOptions;
use crate::plugins::{BlockAction, Plugin, PluginRegistry, Registration, RenderTarget};
use crate::transform::apply_transform;

/// How one block should be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEntry {
    pub block_id: BlockId,
    pub target: RenderTarget,
}

type ErrorCallback = Box<dyn FnMut(&EditorError)>;

pub struct Editor {
    registry: PluginRegistry,
    store: BlockStore,
    router: KeyboardRouter,
    reorder: ReorderEngine,
    on_error: Option<ErrorCallback>,
}

impl Editor {
    pub fn new(blocks: Vec<Block>, options: EditorOptions) -> Self {
        Self::with_clock(blocks, options, Rc::new(SystemClock))
    }

    pub fn with_clock(blocks: Vec<Block>, options: EditorOptions, clock: Rc<dyn Clock>) -> Self {
        let registry = if options.builtin_plugins {
            PluginRegistry::with_builtins()
        } else {
            PluginRegistry::new()
        };
        Self {
            registry,
            router: KeyboardRouter::new(&options),
            reorder: ReorderEngine::new(&options),
            store: BlockStore::with_options(blocks, options, clock),
            on_error: None,
        }
    }

    /// Open a markdown document. Parse diagnostics land in the error list.
    pub fn from_markdown(text: &str, options: EditorOptions) -> Self {
        Self::from_markdown_with_clock(text, options, Rc::new(SystemClock))
    }

    pub fn from_markdown_with_clock(
        text: &str,
        options: EditorOptions,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let mut editor = Self::with_clock(vec![], options, clock.clone());
        let report = Transpiler::new(&editor.registry).parse_with_report(text);
        editor.store =
            BlockStore::with_options(report.blocks, editor.store.options().clone(), clock);
        for diagnostic in report.diagnostics {
            editor.report(diagnostic);
        }
        editor
    }

    /// Called with every error as it is collected.
    pub fn on_error(&mut self, callback: impl FnMut(&EditorError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    fn report(&mut self, error: EditorError) {
        if let Some(callback) = self.on_error.as_mut() {
            callback(&error);
        }
        self.store.dispatch(Action::ReportError(error));
    }

    pub fn state(&self) -> &EditorState {
        self.store.state()
    }

    pub fn blocks(&self) -> &[Block] {
        self.store.blocks()
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn errors(&self) -> &[EditorError] {
        &self.store.state().errors
    }

    pub fn clear_errors(&mut self) {
        self.store.dispatch(Action::ClearErrors);
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        self.store.dispatch(action)
    }

    // Plugins

    pub fn register(&mut self, plugin: impl Into<Plugin>) -> Result<Registration, PluginError> {
        let result = self.registry.register(plugin);
        if let Err(error) = &result {
            self.report(error.clone().into());
        }
        result
    }

    pub fn unregister(&mut self, id: &str) -> Result<Plugin, PluginError> {
        let result = self.registry.unregister(id);
        if let Err(error) = &result {
            self.report(error.clone().into());
        }
        result
    }

    // Interchange

    pub fn set_blocks(&mut self, blocks: Vec<Block>) -> bool {
        self.store.dispatch(Action::SetBlocks(blocks))
    }

    pub fn markdown(&self) -> String {
        Transpiler::new(&self.registry).serialize(self.store.blocks())
    }

    /// Replace the document with parsed markdown. Returns the number of diagnostics.
    pub fn set_markdown(&mut self, text: &str) -> usize {
        let report = Transpiler::new(&self.registry).parse_with_report(text);
        self.store.dispatch(Action::SetBlocks(report.blocks));
        let count = report.diagnostics.len();
        for diagnostic in report.diagnostics {
            self.report(diagnostic);
        }
        count
    }

    pub fn to_json(&self) -> Result<String, IoError> {
        io::blocks_to_json(self.store.blocks())
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), IoError> {
        let blocks = io::blocks_from_json(json)?;
        self.store.dispatch(Action::SetBlocks(blocks));
        Ok(())
    }

    pub fn render_inline(&self, text: &str) -> String {
        Transpiler::new(&self.registry).render_inline(text)
    }

    // Block operations

    /// Insert a block after running its plugin's `on_create`.
    pub fn insert_block(&mut self, block: Block, index: Option<usize>) -> Option<BlockId> {
        let block = self
            .registry
            .controller_for(&block.block_type)
            .on_create(block);
        self.store.add_block(block, index)
    }

    /// Apply changes through the plugin's `on_update`, without markdown promotion.
    pub fn update_block(&mut self, id: &BlockId, changes: BlockChanges) -> bool {
        let Some(block) = self.store.state().block(id) else {
            return false;
        };
        let next = self.registry.apply_update(block, &changes);
        self.store.update_block(id, BlockChanges::from_block(next))
    }

    /// Content edit from the host. Paragraphs whose new content starts with a
    /// markdown marker are promoted to the matching block type.
    pub fn update_content(&mut self, id: &BlockId, content: impl Into<String>) -> bool {
        let Some(block) = self.store.state().block(id) else {
            return false;
        };
        let changes = BlockChanges::content(content);
        let changes = if block.is(types::PARAGRAPH) {
            apply_transform(changes)
        } else {
            changes
        };
        self.update_block(id, changes)
    }

    pub fn convert_block(&mut self, id: &BlockId, block_type: &str, meta: Meta) -> bool {
        self.update_block(id, BlockChanges::retype(block_type, meta))
    }

    pub fn delete_block(&mut self, id: &BlockId) -> bool {
        let Some(block) = self.store.state().block(id) else {
            return false;
        };
        self.registry
            .controller_for(&block.block_type)
            .on_delete(block);
        self.store.delete_block(id)
    }

    pub fn move_block(&mut self, id: &BlockId, new_index: usize) -> bool {
        self.store.move_block(id, new_index)
    }

    pub fn duplicate_block(&mut self, id: &BlockId) -> Option<BlockId> {
        self.store.duplicate_block(id)
    }

    pub fn select_block(&mut self, id: &BlockId, additive: bool) -> bool {
        self.store.select_block(id, additive)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.store.dispatch(Action::ClearSelection)
    }

    pub fn set_focus(&mut self, id: Option<BlockId>) -> bool {
        self.store.set_focus(id)
    }

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Actions the block's plugin offers, followed by its toolbar entries.
    pub fn block_actions(&self, id: &BlockId) -> Vec<BlockAction> {
        let Some(block) = self.store.state().block(id) else {
            return vec![];
        };
        let mut actions = self
            .registry
            .controller_for(&block.block_type)
            .get_actions(block);
        let toolbar = self
            .registry
            .block_plugin(&block.block_type)
            .and_then(|plugin| plugin.toolbar.as_deref())
            .unwrap_or_default();
        for entry in toolbar {
            if !actions.iter().any(|action| action.id == entry.id) {
                actions.push(entry.clone());
            }
        }
        actions
    }

    /// Run a conversion action. Other action ids belong to the host and are ignored.
    pub fn run_action(&mut self, id: &BlockId, action: &BlockAction) -> bool {
        let Some(block_type) = action.convert_to.as_deref() else {
            return false;
        };
        let meta = Conversion::for_type(block_type)
            .and_then(|conversion| conversion.changes().meta)
            .unwrap_or_default();
        self.convert_block(id, block_type, meta)
    }

    // Validation and rendering

    /// Collect a validation error for every block whose type no plugin handles and
    /// return the whole error list.
    pub fn validate(&mut self) -> Vec<EditorError> {
        let problems: Vec<EditorError> = self
            .store
            .blocks()
            .iter()
            .filter(|block| !self.registry.knows_block_type(&block.block_type))
            .map(|block| EditorError::Validation {
                block_id: block.id.clone(),
                block_type: block.block_type.clone(),
            })
            .filter(|problem| !self.errors().contains(problem))
            .collect();
        for problem in problems {
            self.report(problem);
        }
        self.errors().to_vec()
    }

    /// Render component per block. Unknown types degrade to a placeholder and their
    /// lookup error is collected once.
    pub fn render_plan(&mut self) -> Vec<RenderEntry> {
        let plan: Vec<RenderEntry> = self
            .store
            .blocks()
            .iter()
            .map(|block| RenderEntry {
                block_id: block.id.clone(),
                target: self.registry.resolve_render(block),
            })
            .collect();
        for entry in &plan {
            if let RenderTarget::Placeholder(error) = &entry.target
                && !self.errors().contains(error)
            {
                self.report(error.clone());
            }
        }
        plan
    }

    // Input

    pub fn handle_key(&mut self, event: &KeyEvent, caret: Option<Caret>) -> KeyOutcome {
        self.router
            .handle(event, caret, &mut self.store, &self.registry)
    }

    pub fn keyboard(&mut self) -> &mut KeyboardRouter {
        &mut self.router
    }

    pub fn start_drag(&mut self, id: &BlockId, pointer_y: f32, layout: &[BlockLayout]) -> bool {
        self.reorder
            .start(id, pointer_y, layout, &self.store, &self.registry)
    }

    pub fn drag_move(&mut self, pointer_y: f32) -> Option<usize> {
        self.reorder.pointer_move(pointer_y)
    }

    pub fn end_drag(&mut self) -> DropOutcome {
        self.reorder.end(&mut self.store, &self.registry)
    }

    pub fn cancel_drag(&mut self) -> DropOutcome {
        self.reorder.cancel()
    }

    pub fn reorder(&self) -> &ReorderEngine {
        &self.reorder
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{BlockController, BlockPlugin, ComponentRef, PluginManifest};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn editor(blocks: Vec<Block>) -> Editor {
        Editor::new(blocks, EditorOptions::default())
    }

    #[test]
    fn typing_a_marker_promotes_paragraph() {
        let mut ed = editor(vec![Block::paragraph("")]);
        let id = ed.blocks()[0].id.clone();

        assert!(ed.update_content(&id, "## Plans"));
        let block = &ed.blocks()[0];
        assert_eq!(block.block_type, types::HEADING);
        assert_eq!(block.content, "Plans");
        assert_eq!(block.heading_level(), 2);
        assert_eq!(block.id, id);
    }

    #[test]
    fn only_paragraphs_are_promoted() {
        let mut ed = editor(vec![Block::code("", "")]);
        let id = ed.blocks()[0].id.clone();
        ed.update_content(&id, "# not a heading");
        assert_eq!(ed.blocks()[0].block_type, types::CODE);
        assert_eq!(ed.blocks()[0].content, "# not a heading");
    }

    #[test]
    fn markdown_round_trip_through_facade() {
        let mut ed = editor(vec![]);
        assert_eq!(ed.set_markdown("# T\n\n- [x] done\n\n> [!TIP] Try it"), 0);
        assert_eq!(ed.markdown(), "# T\n\n- [x] done\n\n> [!TIP] Try it");
        assert!(ed.can_undo());
    }

    #[test]
    fn opened_documents_keep_the_injected_clock() {
        let clock = Rc::new(crate::clock::ManualClock::new());
        let mut ed =
            Editor::from_markdown_with_clock("draft", EditorOptions::default(), clock.clone());
        let id = ed.blocks()[0].id.clone();

        ed.update_content(&id, "draft 1");
        clock.advance(std::time::Duration::from_secs(1));
        ed.update_content(&id, "draft 2");
        assert_eq!(ed.store().state().history.past.len(), 2);
    }

    #[test]
    fn diagnostics_reach_the_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ed = editor(vec![]);
        let sink = seen.clone();
        ed.on_error(move |error| sink.borrow_mut().push(error.clone()));

        assert_eq!(ed.set_markdown("```\nopen"), 1);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(ed.errors().len(), 1);
    }

    #[test]
    fn unknown_types_are_held_validated_and_placeheld() {
        let mut ed = editor(vec![Block::paragraph("ok"), Block::new("mermaid", "graph")]);

        let problems = ed.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].is_validation());

        let plan = ed.render_plan();
        assert!(matches!(plan[0].target, RenderTarget::Component { .. }));
        assert!(matches!(plan[1].target, RenderTarget::Placeholder(_)));
        ed.render_plan();
        assert_eq!(ed.errors().len(), 2);
        assert_eq!(ed.validate().len(), 2);

        assert_eq!(ed.markdown(), "ok\n\ngraph");
    }

    #[test]
    fn rejected_registration_is_reported() {
        let mut ed = editor(vec![]);
        let duplicate = BlockPlugin::new(
            PluginManifest::new("core.paragraph", "Again", "1.0.0"),
            "paragraph",
            ComponentRef::new("P"),
            crate::plugins::defaults::DefaultController,
        );
        assert!(ed.register(duplicate).is_err());
        assert!(matches!(ed.errors()[0], EditorError::Plugin(PluginError::DuplicateId(_))));
    }

    struct Counting(Rc<RefCell<Vec<&'static str>>>);

    impl BlockController for Counting {
        fn on_create(&self, block: Block) -> Block {
            self.0.borrow_mut().push("create");
            block
        }

        fn on_update(&self, _previous: &Block, next: Block) -> Block {
            self.0.borrow_mut().push("update");
            next
        }

        fn on_delete(&self, _block: &Block) {
            self.0.borrow_mut().push("delete");
        }
    }

    #[test]
    fn lifecycle_hooks_run_around_store_operations() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut ed = editor(vec![]);
        ed.register(BlockPlugin::new(
            PluginManifest::new("test.counting", "Counting", "0.1.0"),
            "counting",
            ComponentRef::new("CountingBlock"),
            Counting(calls.clone()),
        ))
        .unwrap();

        let id = ed.insert_block(Block::new("counting", ""), None).unwrap();
        ed.update_content(&id, "x");
        ed.delete_block(&id);
        assert_eq!(*calls.borrow(), vec!["create", "update", "delete"]);
    }

    #[test]
    fn conversion_action_applies_canonical_meta() {
        let mut ed = editor(vec![Block::paragraph("todo")]);
        let id = ed.blocks()[0].id.clone();
        let action = ed
            .block_actions(&id)
            .into_iter()
            .find(|a| a.convert_to.as_deref() == Some(types::CHECKLIST))
            .unwrap();

        assert!(ed.run_action(&id, &action));
        assert_eq!(ed.blocks()[0].meta_bool("checked"), Some(false));
        assert_eq!(ed.blocks()[0].content, "todo");
    }

    #[test]
    fn json_interchange_round_trip() {
        let ed = editor(vec![Block::heading(3, "H"), Block::divider()]);
        let json = ed.to_json().unwrap();

        let mut other = editor(vec![]);
        other.load_json(&json).unwrap();
        assert_eq!(other.blocks(), ed.blocks());
    }

    #[test]
    fn builtins_can_be_disabled() {
        let options = EditorOptions {
            builtin_plugins: false,
            ..EditorOptions::default()
        };
        let ed = Editor::new(vec![], options);
        assert!(ed.registry().is_empty());
    }
}
