//! Rendering seam between the field tree and the host's widget toolkit.
//!
//! The crate never builds widgets itself. It asks an attached [`UiHost`] to
//! create, update and destroy them, and keeps the returned handles on the
//! nodes so later value and state changes can be pushed.

use tracing::{debug, trace};

use crate::configurator::Configurator;
use crate::error::{ConfigError, ConfigResult};
use crate::tree::visibility::nearest_concrete_ancestor;
use crate::tree::{Effective, NodeKind};
use crate::types::{FieldId, WidgetHandle};
use crate::value::ValueKind;

/// What kind of widget the host should build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetKind<'a> {
    /// Full screen for an opened concrete panel.
    Screen,
    /// Entry that opens a nested concrete panel.
    PanelEntry,
    /// Inline container for a division's children.
    Division,
    Header,
    Button,
    Value(&'a ValueKind),
}

/// Everything the host needs to build one widget.
#[derive(Debug, Clone)]
pub struct WidgetRequest<'a> {
    pub field: FieldId,
    /// Container the widget goes into. `None` for screens.
    pub parent: Option<WidgetHandle>,
    pub kind: WidgetKind<'a>,
    pub display_name: &'a str,
    /// Display form of the current value, for value widgets.
    pub value: Option<String>,
    pub state: Effective,
}

/// Host-side widget factory and sink for updates.
pub trait UiHost {
    fn create_ui(&mut self, request: &WidgetRequest<'_>) -> WidgetHandle;

    fn destroy_ui(&mut self, widget: WidgetHandle);

    fn push_value(&mut self, widget: WidgetHandle, display: &str);

    fn push_state(&mut self, widget: WidgetHandle, state: Effective);

    /// The layout of concrete panel `panel` needs recomputing.
    fn invalidate_layout(&mut self, panel: FieldId);
}

impl Configurator {
    /// Attach the host that renders this configurator. Replaces any
    /// previous host without destroying its widgets.
    pub fn attach_host(&mut self, host: Box<dyn UiHost>) {
        self.host = Some(host);
    }

    pub fn detach_host(&mut self) -> Option<Box<dyn UiHost>> {
        for node in &mut self.nodes {
            node.widget = None;
            if let Some(panel) = node.as_panel_mut() {
                panel.screen = None;
                panel.materialized.clear();
            }
        }
        self.host.take()
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    /// Widget currently rendering `id`, if materialized.
    pub fn widget(&self, id: FieldId) -> ConfigResult<Option<WidgetHandle>> {
        Ok(self.node(id)?.widget)
    }

    /// Screen widget of an open concrete panel.
    pub fn screen(&self, id: FieldId) -> ConfigResult<Option<WidgetHandle>> {
        Ok(self.node(id)?.as_panel().and_then(|p| p.screen))
    }

    /// Materialize a concrete panel's screen and its children.
    ///
    /// Opening an already open panel returns the existing screen. Returns
    /// `None` when no host is attached.
    pub fn open_panel(&mut self, id: FieldId) -> ConfigResult<Option<WidgetHandle>> {
        let node = self.node(id)?;
        let Some(panel) = node.as_panel() else {
            return Err(ConfigError::not_a_panel(id));
        };
        if panel.inline {
            return Err(ConfigError::invalid_schema(
                &node.guid,
                "divisions render inside their parent and cannot be opened",
            ));
        }
        if let Some(screen) = panel.screen {
            return Ok(Some(screen));
        }
        if self.host.is_none() {
            return Ok(None);
        }

        let Some(screen) = self.create_widget(id, None) else {
            return Ok(None);
        };
        let mut created = Vec::new();
        self.materialize_children(id, screen, &mut created);
        if let Some(panel) = self.nodes[id.0].as_panel_mut() {
            panel.screen = Some(screen);
            panel.materialized = created;
        }
        debug!(panel = %self.nodes[id.0].guid, "Opened panel");
        Ok(Some(screen))
    }

    /// Destroy a panel's screen and every widget created under it.
    pub fn close_panel(&mut self, id: FieldId) -> ConfigResult<()> {
        self.check_panel(id)?;
        let (screen, materialized) = match self.nodes[id.0].as_panel_mut() {
            Some(panel) => (panel.screen.take(), std::mem::take(&mut panel.materialized)),
            None => return Ok(()),
        };
        let Some(screen) = screen else {
            return Ok(());
        };
        for child in materialized {
            if let Some(widget) = self.nodes[child.0].widget.take()
                && let Some(host) = self.host.as_mut()
            {
                host.destroy_ui(widget);
            }
        }
        if let Some(host) = self.host.as_mut() {
            host.destroy_ui(screen);
        }
        debug!(panel = %self.nodes[id.0].guid, "Closed panel");
        Ok(())
    }

    fn materialize_children(
        &mut self,
        panel: FieldId,
        container: WidgetHandle,
        created: &mut Vec<FieldId>,
    ) {
        let children = match self.nodes[panel.0].as_panel() {
            Some(p) => p.children.clone(),
            None => return,
        };
        for child in children {
            let node = &self.nodes[child.0];
            // Bridged fields render at their bridge instead.
            if node.bridged {
                continue;
            }
            let slot = match node.kind {
                NodeKind::Bridge { target } => target,
                _ => child,
            };

            let is_division = self.nodes[slot.0].is_division();
            let Some(widget) = self.create_widget(slot, Some(container)) else {
                continue;
            };
            created.push(slot);
            if is_division {
                self.materialize_children(slot, widget, created);
            }
        }
    }

    /// Ask the host for one widget and record it on the node. Without a
    /// parent container the widget is a screen.
    fn create_widget(&mut self, id: FieldId, parent: Option<WidgetHandle>) -> Option<WidgetHandle> {
        let state = self.rendered_state(id).ok()?;
        let host = self.host.as_mut()?;
        let node = &self.nodes[id.0];
        let (kind, value) = match (&node.kind, parent) {
            (_, None) => (WidgetKind::Screen, None),
            (NodeKind::Panel(p), _) if p.inline => (WidgetKind::Division, None),
            (NodeKind::Panel(_), _) => (WidgetKind::PanelEntry, None),
            (NodeKind::Header, _) => (WidgetKind::Header, None),
            (NodeKind::Button { .. }, _) => (WidgetKind::Button, None),
            (NodeKind::Value(field), _) => (
                WidgetKind::Value(&field.kind),
                Some(field.kind.display(&field.value)),
            ),
            (NodeKind::Bridge { .. }, _) => return None,
        };
        let request = WidgetRequest {
            field: id,
            parent,
            kind,
            display_name: &node.display_name,
            value,
            state,
        };
        let handle = host.create_ui(&request);
        trace!(field = %id, widget = handle.0, "Created widget");
        if parent.is_some() {
            self.nodes[id.0].widget = Some(handle);
        }
        Some(handle)
    }

    /// Destroy every widget and open screen in `id`'s subtree.
    pub(crate) fn destroy_subtree_widgets(&mut self, id: FieldId) {
        let mut destroyed = Vec::new();
        self.collect_and_destroy(id, &mut destroyed);
        for node in &mut self.nodes {
            if let Some(panel) = node.as_panel_mut() {
                panel.materialized.retain(|m| !destroyed.contains(m));
            }
        }
    }

    fn collect_and_destroy(&mut self, id: FieldId, destroyed: &mut Vec<FieldId>) {
        if self.nodes[id.0].is_concrete_panel() {
            // Close errors only arise for non-panels.
            let _ = self.close_panel(id);
        }
        if let Some(widget) = self.nodes[id.0].widget.take() {
            if let Some(host) = self.host.as_mut() {
                host.destroy_ui(widget);
            }
            destroyed.push(id);
        }
        let children = match self.nodes[id.0].as_panel() {
            Some(p) => p.children.clone(),
            None => return,
        };
        for child in children {
            self.collect_and_destroy(child, destroyed);
        }
    }

    /// Send the rendered state of `id` to its widget.
    pub(crate) fn push_state(&mut self, id: FieldId) {
        let Some(widget) = self.nodes[id.0].widget else {
            return;
        };
        let Ok(state) = self.rendered_state(id) else {
            return;
        };
        if let Some(host) = self.host.as_mut() {
            host.push_state(widget, state);
        }
    }

    /// Send the current display value of `id` to its widget.
    pub(crate) fn push_value(&mut self, id: FieldId) {
        let node = &self.nodes[id.0];
        let (Some(widget), Some(field)) = (node.widget, node.as_value()) else {
            return;
        };
        let display = field.kind.display(&field.value);
        if let Some(host) = self.host.as_mut() {
            host.push_value(widget, &display);
        }
    }

    pub(crate) fn signal_layout(&mut self, panel: FieldId) {
        trace!(panel = %panel, "Layout invalidated");
        if let Some(host) = self.host.as_mut() {
            host.invalidate_layout(panel);
        }
    }

    /// Signal the concrete panel whose layout contains `id`.
    pub(crate) fn signal_layout_around(&mut self, id: FieldId) {
        if let Some(panel) = nearest_concrete_ancestor(&self.nodes, id) {
            self.signal_layout(panel);
        }
    }
}
