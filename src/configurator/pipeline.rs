//! Value reads and the two change paths.
//!
//! Programmatic sets validate and commit without consulting handlers.
//! User-driven changes validate a candidate, offer it to the field's
//! handlers (which may cancel or rewrite it), then commit through the
//! programmatic path.

use tracing::{debug, warn};

use super::Configurator;
use crate::error::{ConfigError, ConfigResult};
use crate::tree::{NodeKind, ValueField};
use crate::types::FieldId;
use crate::value::{ChangeEvent, ChangeOrigin, ChangeOutcome, Value, ValueKind};

impl Configurator {
    fn value_field(&self, id: FieldId) -> ConfigResult<&ValueField> {
        self.node(id)?
            .as_value()
            .ok_or_else(|| ConfigError::not_a_value_field(id))
    }

    fn value_field_mut(&mut self, id: FieldId) -> ConfigResult<&mut ValueField> {
        self.node_mut(id)?
            .as_value_mut()
            .ok_or_else(|| ConfigError::not_a_value_field(id))
    }

    pub fn value(&self, id: FieldId) -> ConfigResult<&Value> {
        Ok(&self.value_field(id)?.value)
    }

    pub fn default_value(&self, id: FieldId) -> ConfigResult<&Value> {
        Ok(&self.value_field(id)?.default)
    }

    pub fn value_kind(&self, id: FieldId) -> ConfigResult<&ValueKind> {
        Ok(&self.value_field(id)?.kind)
    }

    /// Text a widget shows for the current value.
    pub fn display_value(&self, id: FieldId) -> ConfigResult<String> {
        let field = self.value_field(id)?;
        Ok(field.kind.display(&field.value))
    }

    /// Look up a value by guid.
    pub fn value_of(&self, guid: &str) -> Option<&Value> {
        let id = self.find_field(guid)?;
        self.value(id).ok()
    }

    /// Validate and commit without running handlers. Returns whether the
    /// value changed.
    pub fn set_value(&mut self, id: FieldId, value: impl Into<Value>) -> ConfigResult<bool> {
        let value = value.into();
        let (guid, kind) = {
            let node = self.node(id)?;
            let field = node
                .as_value()
                .ok_or_else(|| ConfigError::not_a_value_field(id))?;
            (node.guid.clone(), field.kind.clone())
        };
        if !kind.accepts(&value) {
            return Err(ConfigError::type_mismatch(&guid, kind.name(), value.type_name()));
        }
        let value = kind
            .coerce(value)
            .map_err(|reason| ConfigError::invalid_value(&guid, reason))?;
        Ok(self.commit(id, value))
    }

    /// Store an already validated value. Returns whether it changed.
    fn commit(&mut self, id: FieldId, value: Value) -> bool {
        let node = &mut self.nodes[id.0];
        let Some(field) = node.as_value_mut() else {
            return false;
        };
        if field.value == value {
            return false;
        }
        let wire = field.kind.serialize(&value);
        field.value = value;
        if field.save_to_config {
            let guid = node.guid.clone();
            self.store.set(&guid, &wire);
        }
        debug!(field = %id, value = %wire, "Committed value");
        self.push_value(id);
        true
    }

    /// User-typed text. Unparseable input is rejected and the widget resynced.
    pub fn submit_input(&mut self, id: FieldId, raw: &str) -> ConfigResult<ChangeOutcome> {
        let field = self.value_field(id)?;
        match field.kind.parse_input(raw) {
            Some(candidate) => self.run_change(id, candidate, ChangeOrigin::User),
            None => {
                let reason = format!("cannot read '{}' as {}", raw, field.kind.name());
                self.push_value(id);
                Ok(ChangeOutcome::Rejected(reason))
            }
        }
    }

    /// User change from a typed widget.
    pub fn submit_value(
        &mut self,
        id: FieldId,
        value: impl Into<Value>,
    ) -> ConfigResult<ChangeOutcome> {
        self.run_change(id, value.into(), ChangeOrigin::User)
    }

    /// User request to restore the default. Handlers may veto it.
    pub fn reset_to_default(&mut self, id: FieldId) -> ConfigResult<ChangeOutcome> {
        let default = self.value_field(id)?.default.clone();
        self.run_change(id, default, ChangeOrigin::Reset)
    }

    /// Load a stored string through the user path, then make the store
    /// entry match the resulting value.
    ///
    /// A canceled reload keeps the field's current value and leaves the
    /// stored entry untouched, so the store keeps what the file held.
    pub fn reload_from_string(&mut self, id: FieldId, raw: &str) -> ConfigResult<ChangeOutcome> {
        let field = self.value_field(id)?;
        let loaded = field.kind.load(raw, &field.default);
        if loaded.repaired {
            warn!(guid = %self.nodes[id.0].guid, raw = %raw, "Stored value repaired");
        }
        let outcome = self.run_change(id, loaded.value, ChangeOrigin::Reload)?;
        if outcome != ChangeOutcome::Canceled {
            self.sync_store_entry(id);
        }
        Ok(outcome)
    }

    /// Reload the default through the user path. Canceling leaves the
    /// store entry alone.
    pub fn reload_default(&mut self, id: FieldId) -> ConfigResult<ChangeOutcome> {
        let default = self.value_field(id)?.default.clone();
        let outcome = self.run_change(id, default, ChangeOrigin::Reload)?;
        if outcome != ChangeOutcome::Canceled {
            self.sync_store_entry(id);
        }
        Ok(outcome)
    }

    /// Write the field's current value into the active store.
    fn sync_store_entry(&mut self, id: FieldId) {
        let node = &self.nodes[id.0];
        if let Some(field) = node.as_value()
            && field.save_to_config
        {
            let wire = field.kind.serialize(&field.value);
            let guid = node.guid.clone();
            self.store.set(&guid, &wire);
        }
    }

    fn run_change(
        &mut self,
        id: FieldId,
        candidate: Value,
        origin: ChangeOrigin,
    ) -> ConfigResult<ChangeOutcome> {
        let (guid, kind, previous, dispatching) = {
            let node = self.node(id)?;
            let field = node
                .as_value()
                .ok_or_else(|| ConfigError::not_a_value_field(id))?;
            (
                node.guid.clone(),
                field.kind.clone(),
                field.value.clone(),
                field.dispatching,
            )
        };
        if !kind.accepts(&candidate) {
            return Err(ConfigError::type_mismatch(&guid, kind.name(), candidate.type_name()));
        }
        let candidate = match kind.coerce(candidate) {
            Ok(v) => v,
            Err(reason) => {
                self.push_value(id);
                return Ok(ChangeOutcome::Rejected(reason));
            }
        };
        if candidate == previous {
            self.push_value(id);
            return Ok(ChangeOutcome::Unchanged);
        }

        // A handler changing its own field commits directly.
        if dispatching {
            self.commit(id, candidate.clone());
            return Ok(ChangeOutcome::Committed(candidate));
        }

        let mut event = ChangeEvent {
            field: id,
            guid: guid.clone(),
            previous,
            value: candidate,
            canceled: false,
            origin,
        };
        self.dispatch(id, &mut event);

        if event.canceled {
            debug!(guid = %guid, ?origin, "Change canceled");
            self.push_value(id);
            return Ok(ChangeOutcome::Canceled);
        }
        if !kind.accepts(&event.value) {
            self.push_value(id);
            return Ok(ChangeOutcome::Rejected(format!(
                "handler produced {} value for {} field",
                event.value.type_name(),
                kind.name()
            )));
        }
        let value = match kind.coerce(event.value) {
            Ok(v) => v,
            Err(reason) => {
                self.push_value(id);
                return Ok(ChangeOutcome::Rejected(reason));
            }
        };
        if self.commit(id, value.clone()) {
            Ok(ChangeOutcome::Committed(value))
        } else {
            self.push_value(id);
            Ok(ChangeOutcome::Unchanged)
        }
    }

    /// Run the field's handlers in order until one cancels.
    fn dispatch(&mut self, id: FieldId, event: &mut ChangeEvent) {
        let mut handlers = match self.value_field_mut(id) {
            Ok(field) => {
                field.dispatching = true;
                std::mem::take(&mut field.handlers)
            }
            Err(_) => return,
        };

        for handler in handlers.iter_mut() {
            if let Err(e) = handler(&mut *self, &mut *event) {
                warn!(guid = %event.guid, error = %e, "Change handler failed, canceling");
                event.cancel();
            }
            if event.canceled {
                break;
            }
        }

        if let Ok(field) = self.value_field_mut(id) {
            // Keep handlers registered during dispatch.
            handlers.append(&mut field.handlers);
            field.handlers = handlers;
            field.dispatching = false;
        }
    }

    /// Register a change handler. Handlers run in registration order.
    pub fn on_change<F>(&mut self, id: FieldId, handler: F) -> ConfigResult<()>
    where
        F: FnMut(&mut Configurator, &mut ChangeEvent) -> anyhow::Result<()> + 'static,
    {
        self.value_field_mut(id)?.handlers.push(Box::new(handler));
        Ok(())
    }

    pub fn on_click<F>(&mut self, id: FieldId, handler: F) -> ConfigResult<()>
    where
        F: FnMut(&mut Configurator, FieldId) -> anyhow::Result<()> + 'static,
    {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Button { handlers } => {
                handlers.push(Box::new(handler));
                Ok(())
            }
            _ => Err(ConfigError::new(
                crate::error::ErrorCode::InvalidSchema,
                format!("field {} is not a button", id),
            )),
        }
    }

    /// Run a button's click handlers. Handler errors are logged.
    pub fn click(&mut self, id: FieldId) -> ConfigResult<()> {
        let mut handlers = match &mut self.node_mut(id)?.kind {
            NodeKind::Button { handlers } => std::mem::take(handlers),
            _ => return Ok(()),
        };
        for handler in handlers.iter_mut() {
            if let Err(e) = handler(&mut *self, id) {
                warn!(field = %id, error = %e, "Click handler failed");
            }
        }
        if let NodeKind::Button { handlers: current } = &mut self.nodes[id.0].kind {
            handlers.append(current);
            *current = handlers;
        }
        Ok(())
    }
}
