//! The configurator: root aggregate owning the field tree, the active store
//! and the preset index.
//!
//! Fields are created through the configurator and addressed by
//! [`FieldId`]. There is no global registry; hosts hold the configurator
//! and pass it around explicitly.

pub mod pipeline;

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, GuidPolicy};
use crate::error::{ConfigError, ConfigResult};
use crate::paths::ConfigLayout;
use crate::presets::PresetIndex;
use crate::render::UiHost;
use crate::store::Store;
use crate::tree::{is_valid_guid, FieldCategory, FieldSpec, Node, NodeKind, ValueField};
use crate::types::{FieldId, Priority};
use crate::value::ClickHandler;

/// Host lifecycle checkpoints that trigger persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The settings menu was closed. Also commits pending preset deletions.
    MenuClosed,
    Quit,
    Paused,
    FocusLost,
}

pub struct Configurator {
    guid: String,
    pub(crate) layout: ConfigLayout,
    guid_policy: GuidPolicy,
    pub(crate) id_words: u8,
    pub(crate) store: Store,
    pub(crate) nodes: Vec<Node>,
    registry: HashMap<String, FieldId>,
    root: FieldId,
    pub(crate) presets: PresetIndex,
    pub(crate) host: Option<Box<dyn UiHost>>,
    pub(crate) bridge_count: usize,
}

impl std::fmt::Debug for Configurator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configurator")
            .field("guid", &self.guid)
            .field("fields", &self.nodes.len())
            .field("active_preset", &self.presets.active())
            .field("dirty", &self.store.is_dirty())
            .finish()
    }
}

impl Configurator {
    /// Open a configurator, loading its preset index and active store.
    pub fn open(guid: &str, display_name: &str, config: &EngineConfig) -> ConfigResult<Self> {
        if !is_valid_guid(guid) || guid.contains(['/', '\\']) || guid.starts_with('.') {
            return Err(ConfigError::invalid_guid(guid));
        }
        let layout = ConfigLayout::new(&config.paths.config_dir, guid);
        let presets = PresetIndex::load(&layout.index_file());
        let store = Store::load(&layout.store_for(presets.active()));

        let mut configurator = Self {
            guid: guid.to_string(),
            layout,
            guid_policy: config.guids.policy,
            id_words: config.presets.id_words.max(1),
            store,
            nodes: vec![Node::panel(guid.to_string(), display_name.to_string(), false)],
            registry: HashMap::new(),
            root: FieldId(0),
            presets,
            host: None,
            bridge_count: 0,
        };

        if config.presets.discover_on_open {
            configurator.discover_presets()?;
        }
        info!(
            guid = %guid,
            dir = %configurator.layout.root().display(),
            preset = configurator.presets.active().unwrap_or("default"),
            "Opened configurator"
        );
        Ok(configurator)
    }

    /// Open with default engine settings rooted at `dir`.
    pub fn with_dir(dir: &Path, guid: &str, display_name: &str) -> ConfigResult<Self> {
        Self::open(guid, display_name, &EngineConfig::with_config_dir(dir))
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    /// Root panel.
    pub fn root(&self) -> FieldId {
        self.root
    }

    pub(crate) fn node(&self, id: FieldId) -> ConfigResult<&Node> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| ConfigError::field_not_found(id))
    }

    pub(crate) fn node_mut(&mut self, id: FieldId) -> ConfigResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| ConfigError::field_not_found(id))
    }

    // Tree construction

    pub fn add_panel(
        &mut self,
        parent: FieldId,
        guid: &str,
        display_name: &str,
    ) -> ConfigResult<FieldId> {
        let node = Node::panel(guid.to_string(), display_name.to_string(), false);
        self.register(parent, node)
    }

    /// Inline panel rendered inside its parent's screen.
    pub fn add_division(
        &mut self,
        parent: FieldId,
        guid: &str,
        display_name: &str,
    ) -> ConfigResult<FieldId> {
        let node = Node::panel(guid.to_string(), display_name.to_string(), true);
        self.register(parent, node)
    }

    pub fn add_header(&mut self, parent: FieldId, text: &str) -> ConfigResult<FieldId> {
        let mut node = Node::new(String::new(), text.to_string(), NodeKind::Header);
        node.strict_guid = false;
        self.insert_node(parent, node)
    }

    pub fn add_button(
        &mut self,
        parent: FieldId,
        guid: &str,
        display_name: &str,
    ) -> ConfigResult<FieldId> {
        let handlers: Vec<ClickHandler> = Vec::new();
        let node = Node::new(
            guid.to_string(),
            display_name.to_string(),
            NodeKind::Button { handlers },
        );
        self.register(parent, node)
    }

    /// Add a typed value field, seeding or loading its value from the store.
    pub fn add_field(&mut self, parent: FieldId, spec: FieldSpec) -> ConfigResult<FieldId> {
        self.check_panel(parent)?;
        if spec.save_to_config && !is_valid_guid(&spec.guid) {
            return Err(ConfigError::invalid_guid(&spec.guid));
        }
        spec.kind.check_schema(&spec.guid, &spec.default)?;
        // Refuse before touching the store.
        if self.guid_policy == GuidPolicy::Reject
            && self.strict_clash(&spec.guid, spec.strict_guid).is_some()
        {
            return Err(ConfigError::duplicate_guid(&spec.guid));
        }

        let mut value = spec.default.clone();
        if spec.save_to_config {
            match self.store.get(&spec.guid).map(str::to_string) {
                Some(raw) => {
                    let loaded = spec.kind.load(&raw, &spec.default);
                    if loaded.repaired {
                        warn!(guid = %spec.guid, raw = %raw, "Stored value repaired");
                        let wire = spec.kind.serialize(&loaded.value);
                        self.store.set(&spec.guid, &wire);
                    }
                    value = loaded.value;
                }
                None => {
                    let wire = spec.kind.serialize(&spec.default);
                    self.store.set(&spec.guid, &wire);
                }
            }
        }

        let mut node = Node::new(
            spec.guid,
            spec.display_name,
            NodeKind::Value(ValueField {
                kind: spec.kind,
                value,
                default: spec.default,
                save_to_config: spec.save_to_config,
                handlers: Vec::new(),
                dispatching: false,
            }),
        );
        node.priority = spec.priority;
        node.strict_guid = spec.strict_guid;
        node.state.own_hidden = spec.hidden;
        node.state.own_interactable = spec.interactable;
        self.register(parent, node)
    }

    /// Apply the guid policy, then insert and index the node.
    fn register(&mut self, parent: FieldId, node: Node) -> ConfigResult<FieldId> {
        self.check_panel(parent)?;
        let guid = node.guid.clone();
        let strict = node.strict_guid;
        if let Some(existing) = self.strict_clash(&guid, strict) {
            match self.guid_policy {
                GuidPolicy::Reject => return Err(ConfigError::duplicate_guid(&guid)),
                GuidPolicy::Diagnostic => {
                    warn!(guid = %guid, previous = %existing, "Duplicate guid")
                }
            }
        }
        let id = self.insert_node(parent, node)?;
        // A loose registration never shadows a strict one.
        let shadows_strict = !strict
            && self
                .registry
                .get(&guid)
                .is_some_and(|existing| self.nodes[existing.0].strict_guid);
        if !guid.is_empty() && !shadows_strict {
            self.registry.insert(guid, id);
        }
        Ok(id)
    }

    /// Earlier strict field that a new strict registration of `guid` would
    /// collide with. Empty guids never collide.
    fn strict_clash(&self, guid: &str, strict: bool) -> Option<FieldId> {
        if !strict || guid.is_empty() {
            return None;
        }
        let existing = self.registry.get(guid).copied()?;
        self.nodes[existing.0].strict_guid.then_some(existing)
    }

    /// Link a node under `parent` with inherited state.
    pub(crate) fn insert_node(&mut self, parent: FieldId, mut node: Node) -> ConfigResult<FieldId> {
        self.check_panel(parent)?;
        let inherited = self.nodes[parent.0].state.effective();
        node.parent = Some(parent);
        node.state.inherited_hidden = inherited.hidden;
        node.state.inherited_interactable = inherited.interactable;

        let id = FieldId(self.nodes.len());
        debug!(field = %id, guid = %node.guid, category = ?node.category(), "Added field");
        self.nodes.push(node);
        if let Some(panel) = self.nodes[parent.0].as_panel_mut() {
            panel.children.push(id);
        }
        if self.nodes[parent.0].is_division() {
            self.signal_layout_around(id);
        }
        Ok(id)
    }

    // Accessors

    /// Latest field registered under `guid`.
    pub fn find_field(&self, guid: &str) -> Option<FieldId> {
        self.registry.get(guid).copied()
    }

    pub fn field_guid(&self, id: FieldId) -> ConfigResult<&str> {
        Ok(&self.node(id)?.guid)
    }

    pub fn display_name(&self, id: FieldId) -> ConfigResult<&str> {
        Ok(&self.node(id)?.display_name)
    }

    pub fn category(&self, id: FieldId) -> ConfigResult<FieldCategory> {
        Ok(self.node(id)?.category())
    }

    pub fn parent(&self, id: FieldId) -> ConfigResult<Option<FieldId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: FieldId) -> ConfigResult<&[FieldId]> {
        match self.node(id)?.as_panel() {
            Some(panel) => Ok(&panel.children),
            None => Err(ConfigError::not_a_panel(id)),
        }
    }

    pub fn priority(&self, id: FieldId) -> ConfigResult<Priority> {
        Ok(self.node(id)?.priority)
    }

    pub fn field_count(&self) -> usize {
        self.nodes.len()
    }

    /// Strict guids registered more than once, sorted.
    pub fn duplicate_guids(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for node in self.nodes.iter().skip(1) {
            if node.strict_guid && !node.guid.is_empty() {
                *counts.entry(node.guid.as_str()).or_default() += 1;
            }
        }
        let mut dups: Vec<String> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(guid, _)| guid.to_string())
            .collect();
        dups.sort();
        dups
    }

    // Persistence

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Whether the active store has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Write the active store and the preset index, each only if dirty.
    /// Returns whether anything was written.
    pub fn flush(&mut self) -> ConfigResult<bool> {
        let store = self.flush_store()?;
        let index = self.flush_index()?;
        Ok(store || index)
    }

    pub fn handle_lifecycle(&mut self, event: LifecycleEvent) -> ConfigResult<()> {
        debug!(?event, "Lifecycle event");
        if event == LifecycleEvent::MenuClosed {
            self.commit_pending_deletes()?;
        }
        self.flush()?;
        Ok(())
    }
}
