//! Bridges: render a field somewhere else in the tree.
//!
//! The target keeps its parent, value and store entry. Only its widget moves
//! to the bridge's slot.

use tracing::info;

use super::{Node, NodeKind};
use crate::configurator::Configurator;
use crate::error::{ConfigError, ConfigResult};
use crate::types::FieldId;

impl Configurator {
    /// Add a bridge under `parent` that renders `target` in its place.
    ///
    /// A field can be bridged once. Root panels and the bridge's own parent
    /// are rejected.
    pub fn add_bridge(&mut self, parent: FieldId, target: FieldId) -> ConfigResult<FieldId> {
        self.check_panel(parent)?;
        let target_node = self.node(target)?;
        if target_node.bridged {
            return Err(ConfigError::already_bridged(&target_node.guid));
        }
        if target_node.parent.is_none() {
            return Err(ConfigError::invalid_bridge_target("root panels cannot be bridged"));
        }
        if target == parent {
            return Err(ConfigError::invalid_bridge_target(
                "a bridge cannot target its own parent",
            ));
        }
        if self.is_ancestor(target, parent) {
            return Err(ConfigError::invalid_bridge_target(
                "a bridge cannot sit inside its target",
            ));
        }
        if matches!(target_node.kind, NodeKind::Bridge { .. }) {
            return Err(ConfigError::invalid_bridge_target("bridges cannot be bridged"));
        }

        let target_guid = target_node.guid.clone();
        let display_name = target_node.display_name.clone();
        self.bridge_count += 1;
        let guid = format!("__bridge_{}", self.bridge_count);
        let mut node = Node::new(guid, display_name, NodeKind::Bridge { target });
        node.strict_guid = false;
        let id = self.insert_node(parent, node)?;

        self.destroy_subtree_widgets(target);
        let target_node = &mut self.nodes[target.0];
        target_node.bridged = true;
        target_node.bridged_by = Some(id);

        // The target's old slot is now empty.
        self.signal_layout_around(target);
        self.signal_layout_around(id);
        info!(target = %target_guid, bridge = %id, "Bridged field");
        Ok(id)
    }

    /// Whether `ancestor` lies on the parent chain of `id`.
    fn is_ancestor(&self, ancestor: FieldId, id: FieldId) -> bool {
        let mut current = self.nodes[id.0].parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.nodes[p.0].parent;
        }
        false
    }

    pub fn is_bridged(&self, id: FieldId) -> ConfigResult<bool> {
        Ok(self.node(id)?.bridged)
    }

    /// Bridge that renders `id`, if any.
    pub fn bridged_by(&self, id: FieldId) -> ConfigResult<Option<FieldId>> {
        Ok(self.node(id)?.bridged_by)
    }

    /// Field rendered by bridge `id`.
    pub fn bridge_target(&self, id: FieldId) -> ConfigResult<Option<FieldId>> {
        match self.node(id)?.kind {
            NodeKind::Bridge { target } => Ok(Some(target)),
            _ => Ok(None),
        }
    }
}
