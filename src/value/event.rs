//! Change events raised by the user-driven value pipeline.

use super::Value;
use crate::configurator::Configurator;
use crate::types::FieldId;

/// What started a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Input from the host's widget.
    User,
    /// Reset-to-default request.
    Reset,
    /// Preset switch or reset replaying stored values.
    Reload,
}

/// Proposed change offered to a field's handlers before commit.
///
/// Handlers may rewrite `value` or set `canceled`.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub field: FieldId,
    pub guid: String,
    pub previous: Value,
    pub value: Value,
    pub canceled: bool,
    pub origin: ChangeOrigin,
}

impl ChangeEvent {
    pub fn cancel(&mut self) {
        self.canceled = true;
    }
}

/// How a user-driven change ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome {
    /// The value changed and was committed.
    Committed(Value),
    /// The candidate equals the current value.
    Unchanged,
    /// A handler canceled or failed.
    Canceled,
    /// Input could not be validated.
    Rejected(String),
}

impl ChangeOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ChangeOutcome::Committed(_))
    }
}

/// Value change handler. Errors are logged and count as a cancel.
pub type ChangeHandler = Box<dyn FnMut(&mut Configurator, &mut ChangeEvent) -> anyhow::Result<()>>;

/// Button click handler.
pub type ClickHandler = Box<dyn FnMut(&mut Configurator, FieldId) -> anyhow::Result<()>>;
