//! Cascading hidden/interactable state.
//!
//! Setting a node's own state runs [`propagate`] over its subtree so every
//! descendant's inherited state is consistent when the setter returns.

use std::collections::BTreeSet;
use tracing::trace;

use super::{Node, NodeKind};
use crate::configurator::Configurator;
use crate::error::{ConfigError, ConfigResult};
use crate::types::FieldId;

/// Resolved state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effective {
    pub hidden: bool,
    pub interactable: bool,
}

/// Push inherited state into `id` and, for panels, down the whole subtree.
///
/// Records every node whose effective state changed in `changed`.
pub(crate) fn propagate(
    nodes: &mut [Node],
    id: FieldId,
    inherited_hidden: bool,
    inherited_interactable: bool,
    changed: &mut Vec<FieldId>,
) {
    let node = &mut nodes[id.0];
    let before = node.state.effective();
    node.state.inherited_hidden = inherited_hidden;
    node.state.inherited_interactable = inherited_interactable;
    let after = node.state.effective();
    if before != after {
        changed.push(id);
    }

    let children = match &node.kind {
        NodeKind::Panel(panel) => panel.children.clone(),
        _ => return,
    };
    for child in children {
        propagate(nodes, child, after.hidden, after.interactable, changed);
    }
}

/// Nearest ancestor of `id` that is a concrete (non-division) panel.
pub(crate) fn nearest_concrete_ancestor(nodes: &[Node], id: FieldId) -> Option<FieldId> {
    let mut current = nodes[id.0].parent;
    while let Some(p) = current {
        if nodes[p.0].is_concrete_panel() {
            return Some(p);
        }
        current = nodes[p.0].parent;
    }
    None
}

impl Configurator {
    /// Effective hidden state: own OR inherited.
    pub fn is_hidden(&self, id: FieldId) -> ConfigResult<bool> {
        Ok(self.node(id)?.state.effective().hidden)
    }

    /// Effective interactability: own AND inherited.
    pub fn is_interactable(&self, id: FieldId) -> ConfigResult<bool> {
        Ok(self.node(id)?.state.effective().interactable)
    }

    pub fn own_hidden(&self, id: FieldId) -> ConfigResult<bool> {
        Ok(self.node(id)?.state.own_hidden)
    }

    pub fn own_interactable(&self, id: FieldId) -> ConfigResult<bool> {
        Ok(self.node(id)?.state.own_interactable)
    }

    pub fn set_hidden(&mut self, id: FieldId, hidden: bool) -> ConfigResult<()> {
        let node = self.node_mut(id)?;
        let before = node.state.effective();
        node.state.own_hidden = hidden;
        self.refresh_subtree(id, before);
        Ok(())
    }

    pub fn set_interactable(&mut self, id: FieldId, interactable: bool) -> ConfigResult<()> {
        let node = self.node_mut(id)?;
        let before = node.state.effective();
        node.state.own_interactable = interactable;
        self.refresh_subtree(id, before);
        Ok(())
    }

    /// Re-run propagation from `id` using its parent's effective state.
    /// `before` is the node's effective state prior to its own change.
    pub(crate) fn refresh_subtree(&mut self, id: FieldId, before: Effective) {
        let (inherited_hidden, inherited_interactable) = match self.nodes[id.0].parent {
            Some(p) => {
                let e = self.nodes[p.0].state.effective();
                (e.hidden, e.interactable)
            }
            None => (false, true),
        };

        let mut changed = Vec::new();
        propagate(
            &mut self.nodes,
            id,
            inherited_hidden,
            inherited_interactable,
            &mut changed,
        );
        changed.retain(|c| *c != id);
        if self.nodes[id.0].state.effective() != before {
            changed.insert(0, id);
        }

        trace!(field = %id, changed = changed.len(), "Propagated visibility");
        self.apply_state_changes(&changed);
    }

    /// Push new state to widgets and signal layout for division changes.
    pub(crate) fn apply_state_changes(&mut self, changed: &[FieldId]) {
        let mut layout_targets = BTreeSet::new();
        for &id in changed {
            self.push_state(id);
            if let NodeKind::Bridge { target } = self.nodes[id.0].kind {
                self.push_state(target);
            }
            let node = &self.nodes[id.0];
            let in_division = node
                .parent
                .is_some_and(|p| self.nodes[p.0].is_division());
            if (node.is_division() || in_division)
                && let Some(ancestor) = nearest_concrete_ancestor(&self.nodes, id)
            {
                layout_targets.insert(ancestor);
            }
        }
        for panel in layout_targets {
            self.signal_layout(panel);
        }
    }

    /// State shown by the widget at `id`'s render slot. A bridged target
    /// also takes on its bridge's state.
    pub fn rendered_state(&self, id: FieldId) -> ConfigResult<Effective> {
        let node = self.node(id)?;
        let mut state = node.state.effective();
        if let Some(bridge) = node.bridged_by {
            let b = self.nodes[bridge.0].state.effective();
            state.hidden |= b.hidden;
            state.interactable &= b.interactable;
        }
        Ok(state)
    }

    pub(crate) fn check_panel(&self, id: FieldId) -> ConfigResult<()> {
        match self.node(id)?.kind {
            NodeKind::Panel(_) => Ok(()),
            _ => Err(ConfigError::not_a_panel(id)),
        }
    }
}
