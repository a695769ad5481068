use indexmap::IndexMap;

use crate::error::{EditorError, PluginError};
use crate::models::{Block, BlockChanges};

use super::defaults::DefaultController;
use super::{
    BlockController, BlockPlugin, ComponentRef, MarkdownPlugin, Plugin, PluginManifest, builtin,
};

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// The plugin took over a block type previously bound to `previous`.
    ReplacedBinding {
        block_type: String,
        previous: String,
    },
}

/// How the rendering collaborator should display a block.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTarget {
    Component {
        plugin_id: String,
        component: ComponentRef,
    },
    /// No plugin knows the block's type; show an error placeholder instead.
    Placeholder(EditorError),
}

/// The active plugin set.
///
/// Plugins are kept in registration order; block types map to the plugin that
/// answers for them; markdown plugin ids are kept sorted by descending priority
/// with ties in registration order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Plugin>,
    block_bindings: IndexMap<String, String>,
    markdown_order: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in block and markdown plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for error in registry.register_all(builtin::plugins()) {
            log::error!("built-in plugin rejected: {error}");
        }
        registry
    }

    /// Validate and register one plugin. Nothing is registered on error.
    pub fn register(&mut self, plugin: impl Into<Plugin>) -> Result<Registration, PluginError> {
        let plugin = plugin.into();
        validate_manifest(plugin.manifest())?;
        match &plugin {
            Plugin::Block(block) => validate_block_plugin(block)?,
            Plugin::Markdown(markdown) => validate_markdown_plugin(markdown)?,
        }

        let id = plugin.id().to_string();
        if self.plugins.contains_key(&id) {
            return Err(PluginError::DuplicateId(id));
        }

        let mut outcome = Registration::Registered;
        match &plugin {
            Plugin::Block(block) => {
                if let Some(previous) = self
                    .block_bindings
                    .insert(block.block_type.clone(), id.clone())
                {
                    log::warn!(
                        "block type '{}' rebound from plugin '{}' to '{}'",
                        block.block_type,
                        previous,
                        id
                    );
                    outcome = Registration::ReplacedBinding {
                        block_type: block.block_type.clone(),
                        previous,
                    };
                }
            }
            Plugin::Markdown(markdown) => {
                let priority = markdown.priority();
                let position = self
                    .markdown_order
                    .iter()
                    .position(|other| self.markdown_priority(other) < priority)
                    .unwrap_or(self.markdown_order.len());
                self.markdown_order.insert(position, id.clone());
            }
        }

        log::info!("registered plugin '{id}'");
        self.plugins.insert(id, plugin);
        Ok(outcome)
    }

    /// Register every plugin, skipping invalid ones. Returns the rejections.
    pub fn register_all(&mut self, plugins: impl IntoIterator<Item = Plugin>) -> Vec<PluginError> {
        let mut errors = Vec::new();
        for plugin in plugins {
            if let Err(error) = self.register(plugin) {
                log::warn!("plugin registration skipped: {error}");
                errors.push(error);
            }
        }
        errors
    }

    pub fn unregister(&mut self, id: &str) -> Result<Plugin, PluginError> {
        let plugin = self
            .plugins
            .shift_remove(id)
            .ok_or_else(|| PluginError::UnknownPlugin(id.to_string()))?;

        match &plugin {
            Plugin::Block(block) => {
                let owns_binding = self
                    .block_bindings
                    .get(&block.block_type)
                    .is_some_and(|bound| bound == id);
                if owns_binding {
                    let fallback = self.plugins.values().rev().find_map(|other| match other {
                        Plugin::Block(other) if other.block_type == block.block_type => {
                            Some(other.manifest.id.clone())
                        }
                        _ => None,
                    });
                    match fallback {
                        Some(fallback) => {
                            self.block_bindings
                                .insert(block.block_type.clone(), fallback);
                        }
                        None => {
                            self.block_bindings.shift_remove(&block.block_type);
                        }
                    }
                }
            }
            Plugin::Markdown(_) => self.markdown_order.retain(|other| other != id),
        }

        log::info!("unregistered plugin '{id}'");
        Ok(plugin)
    }

    pub fn plugin(&self, id: &str) -> Option<&Plugin> {
        self.plugins.get(id)
    }

    /// The plugin currently answering for `block_type`.
    pub fn block_plugin(&self, block_type: &str) -> Option<&BlockPlugin> {
        self.block_bindings
            .get(block_type)
            .and_then(|id| self.plugins.get(id))
            .and_then(Plugin::as_block)
    }

    /// Controller for `block_type`; unknown types get the default hooks.
    pub fn controller_for(&self, block_type: &str) -> &dyn BlockController {
        match self.block_plugin(block_type) {
            Some(plugin) => plugin.controller(),
            None => &DefaultController,
        }
    }

    /// Merge `changes` into `block` and let the controller of the resulting type
    /// adjust the outcome through `on_update`.
    pub fn apply_update(&self, block: &Block, changes: &BlockChanges) -> Block {
        let next = changes.merged_into(block);
        self.controller_for(&next.block_type).on_update(block, next)
    }

    /// Markdown plugins, highest priority first.
    pub fn markdown_plugins(&self) -> impl DoubleEndedIterator<Item = &MarkdownPlugin> + '_ {
        self.markdown_order
            .iter()
            .filter_map(|id| self.plugins.get(id).and_then(Plugin::as_markdown))
    }

    /// Block plugins that currently own a block type binding, in binding order.
    pub fn block_plugins(&self) -> impl Iterator<Item = &BlockPlugin> + '_ {
        self.block_bindings
            .values()
            .filter_map(|id| self.plugins.get(id).and_then(Plugin::as_block))
    }

    pub fn block_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.block_bindings.keys().map(String::as_str)
    }

    pub fn knows_block_type(&self, block_type: &str) -> bool {
        self.block_bindings.contains_key(block_type)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Resolve the render component for a block, degrading to a placeholder.
    pub fn resolve_render(&self, block: &Block) -> RenderTarget {
        match self
            .block_plugin(&block.block_type)
            .and_then(|plugin| plugin.component.clone().map(|c| (plugin, c)))
        {
            Some((plugin, component)) => RenderTarget::Component {
                plugin_id: plugin.manifest.id.clone(),
                component,
            },
            None => RenderTarget::Placeholder(EditorError::RenderLookup {
                block_id: block.id.clone(),
                block_type: block.block_type.clone(),
            }),
        }
    }

    fn markdown_priority(&self, id: &str) -> i32 {
        self.plugins
            .get(id)
            .and_then(Plugin::as_markdown)
            .map(MarkdownPlugin::priority)
            .unwrap_or(i32::MIN)
    }
}

fn require(plugin_id: &str, field: &'static str, value: &str) -> Result<(), PluginError> {
    if value.trim().is_empty() {
        return Err(PluginError::MissingField {
            plugin_id: plugin_id.to_string(),
            field,
        });
    }
    Ok(())
}

fn validate_manifest(manifest: &PluginManifest) -> Result<(), PluginError> {
    require(&manifest.id, "id", &manifest.id)?;
    require(&manifest.id, "name", &manifest.name)?;
    require(&manifest.id, "version", &manifest.version)
}

fn validate_block_plugin(plugin: &BlockPlugin) -> Result<(), PluginError> {
    let id = &plugin.manifest.id;
    require(id, "blockType", &plugin.block_type)?;
    match &plugin.component {
        Some(component) if !component.0.trim().is_empty() => {}
        _ => return Err(PluginError::MissingComponent(id.clone())),
    }
    if plugin.controller.is_none() {
        return Err(PluginError::MissingController(id.clone()));
    }
    Ok(())
}

fn validate_markdown_plugin(plugin: &MarkdownPlugin) -> Result<(), PluginError> {
    let id = &plugin.manifest.id;
    if plugin.parser.is_none() {
        return Err(PluginError::MissingParser(id.clone()));
    }
    if plugin.serializer.is_none() {
        return Err(PluginError::MissingSerializer(id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::defaults::DefaultController;
    use crate::plugins::{MarkdownParser, MarkdownSerializer, MarkdownSyntax};
    use pretty_assertions::assert_eq;

    struct Never;

    impl MarkdownParser for Never {
        fn can_parse(&self, _line: &str) -> bool {
            false
        }

        fn parse_block(&self, _line: &str) -> Option<Block> {
            None
        }
    }

    impl MarkdownSerializer for Never {
        fn can_serialize(&self, _block: &Block) -> bool {
            false
        }

        fn serialize_block(&self, _block: &Block) -> Option<String> {
            None
        }
    }

    fn block_plugin(id: &str, block_type: &str) -> BlockPlugin {
        BlockPlugin::new(
            PluginManifest::new(id, id, "1.0.0"),
            block_type,
            ComponentRef::new(format!("{id}-view")),
            DefaultController,
        )
    }

    fn markdown_plugin(id: &str, priority: i32) -> MarkdownPlugin {
        MarkdownPlugin::new(
            PluginManifest::new(id, id, "1.0.0"),
            MarkdownSyntax {
                priority,
                ..MarkdownSyntax::default()
            },
            Never,
            Never,
        )
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = PluginRegistry::new();
        registry.register(block_plugin("p", "note")).unwrap();
        let err = registry.register(block_plugin("p", "other")).unwrap_err();
        assert_eq!(err, PluginError::DuplicateId("p".to_string()));
        assert!(registry.block_plugin("other").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn later_block_plugin_takes_over_type() {
        let mut registry = PluginRegistry::new();
        registry.register(block_plugin("first", "note")).unwrap();
        let outcome = registry.register(block_plugin("second", "note")).unwrap();
        assert_eq!(
            outcome,
            Registration::ReplacedBinding {
                block_type: "note".to_string(),
                previous: "first".to_string()
            }
        );
        assert_eq!(registry.block_plugin("note").unwrap().manifest.id, "second");
        assert_eq!(registry.block_plugins().count(), 1);
    }

    #[test]
    fn unregistering_owner_falls_back_to_previous_binding() {
        let mut registry = PluginRegistry::new();
        registry.register(block_plugin("first", "note")).unwrap();
        registry.register(block_plugin("second", "note")).unwrap();
        registry.unregister("second").unwrap();
        assert_eq!(registry.block_plugin("note").unwrap().manifest.id, "first");
        registry.unregister("first").unwrap();
        assert!(registry.block_plugin("note").is_none());
        assert!(!registry.knows_block_type("note"));
    }

    #[test]
    fn unregister_unknown_is_an_error() {
        let mut registry = PluginRegistry::new();
        assert_eq!(
            registry.unregister("ghost").unwrap_err(),
            PluginError::UnknownPlugin("ghost".to_string())
        );
    }

    #[test]
    fn validation_rejects_missing_fields() {
        let mut registry = PluginRegistry::new();

        let mut nameless = block_plugin("x", "note");
        nameless.manifest.name = String::new();
        assert!(matches!(
            registry.register(nameless),
            Err(PluginError::MissingField { field: "name", .. })
        ));

        let mut typeless = block_plugin("y", "");
        typeless.block_type = "  ".to_string();
        assert!(matches!(
            registry.register(typeless),
            Err(PluginError::MissingField {
                field: "blockType",
                ..
            })
        ));

        let mut headless = block_plugin("z", "note");
        headless.controller = None;
        assert_eq!(
            registry.register(headless).unwrap_err(),
            PluginError::MissingController("z".to_string())
        );

        let mut invisible = block_plugin("w", "note");
        invisible.component = None;
        assert_eq!(
            registry.register(invisible).unwrap_err(),
            PluginError::MissingComponent("w".to_string())
        );

        let mut parserless = markdown_plugin("m", 1);
        parserless.parser = None;
        assert_eq!(
            registry.register(parserless).unwrap_err(),
            PluginError::MissingParser("m".to_string())
        );

        let mut mute = markdown_plugin("s", 1);
        mute.serializer = None;
        assert_eq!(
            registry.register(mute).unwrap_err(),
            PluginError::MissingSerializer("s".to_string())
        );

        assert!(registry.is_empty());
    }

    #[test]
    fn markdown_plugins_sorted_by_priority_then_registration() {
        let mut registry = PluginRegistry::new();
        registry.register(markdown_plugin("low", 10)).unwrap();
        registry.register(markdown_plugin("high-a", 100)).unwrap();
        registry.register(markdown_plugin("mid", 50)).unwrap();
        registry.register(markdown_plugin("high-b", 100)).unwrap();
        registry.register(markdown_plugin("low-b", 10)).unwrap();

        let order: Vec<_> = registry
            .markdown_plugins()
            .map(|p| p.manifest.id.as_str())
            .collect();
        assert_eq!(order, vec!["high-a", "high-b", "mid", "low", "low-b"]);

        registry.unregister("mid").unwrap();
        let order: Vec<_> = registry
            .markdown_plugins()
            .map(|p| p.manifest.id.as_str())
            .collect();
        assert_eq!(order, vec!["high-a", "high-b", "low", "low-b"]);
    }

    #[test]
    fn register_all_continues_after_rejection() {
        let mut registry = PluginRegistry::new();
        let errors = registry.register_all(vec![
            block_plugin("a", "one").into(),
            block_plugin("a", "two").into(),
            block_plugin("b", "three").into(),
        ]);
        assert_eq!(errors, vec![PluginError::DuplicateId("a".to_string())]);
        assert!(registry.block_plugin("one").is_some());
        assert!(registry.block_plugin("three").is_some());
    }

    #[test]
    fn unknown_type_renders_placeholder() {
        let registry = PluginRegistry::new();
        let block = Block::new("mystery", "???");
        match registry.resolve_render(&block) {
            RenderTarget::Placeholder(EditorError::RenderLookup { block_type, .. }) => {
                assert_eq!(block_type, "mystery")
            }
            other => panic!("unexpected render target {other:?}"),
        }
    }

    #[test]
    fn builtins_cover_all_shipped_types() {
        let registry = PluginRegistry::with_builtins();
        for block_type in [
            "paragraph",
            "heading",
            "quote",
            "list",
            "checklist",
            "code",
            "divider",
            "callout",
            "video",
        ] {
            assert!(
                registry.knows_block_type(block_type),
                "missing built-in {block_type}"
            );
        }
        assert!(registry.markdown_plugins().count() >= 3);
    }
}
