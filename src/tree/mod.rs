//! Field tree nodes.
//!
//! Nodes live in the configurator's arena and refer to each other by
//! [`FieldId`]. Parents own their children through the `children` list;
//! `parent` is a plain back-reference.

pub mod bridge;
pub mod visibility;

use crate::types::{Color, FieldId, KeyCode, Priority, PRIORITY_DEFAULT, WidgetHandle};
use crate::value::{
    Bounds, BoundsPolicy, ChangeHandler, ClickHandler, NumberDisplay, RichText, Value, ValueKind,
};

pub use visibility::Effective;

/// Own and inherited visibility/interactability of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    pub own_hidden: bool,
    pub own_interactable: bool,
    pub inherited_hidden: bool,
    pub inherited_interactable: bool,
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self {
            own_hidden: false,
            own_interactable: true,
            inherited_hidden: false,
            inherited_interactable: true,
        }
    }
}

impl VisibilityState {
    pub fn effective(&self) -> Effective {
        Effective {
            hidden: self.own_hidden || self.inherited_hidden,
            interactable: self.own_interactable && self.inherited_interactable,
        }
    }
}

pub(crate) struct PanelData {
    pub(crate) children: Vec<FieldId>,
    /// Divisions render inline inside their parent's screen.
    pub(crate) inline: bool,
    /// Screen widget while this panel is open.
    pub(crate) screen: Option<WidgetHandle>,
    /// Nodes that received a widget while this screen was materialized.
    pub(crate) materialized: Vec<FieldId>,
}

pub(crate) struct ValueField {
    pub(crate) kind: ValueKind,
    pub(crate) value: Value,
    pub(crate) default: Value,
    pub(crate) save_to_config: bool,
    pub(crate) handlers: Vec<ChangeHandler>,
    pub(crate) dispatching: bool,
}

pub(crate) enum NodeKind {
    Panel(PanelData),
    Bridge { target: FieldId },
    Value(ValueField),
    Button { handlers: Vec<ClickHandler> },
    Header,
}

pub(crate) struct Node {
    pub(crate) guid: String,
    pub(crate) display_name: String,
    pub(crate) strict_guid: bool,
    pub(crate) priority: Priority,
    pub(crate) parent: Option<FieldId>,
    pub(crate) state: VisibilityState,
    pub(crate) bridged: bool,
    pub(crate) bridged_by: Option<FieldId>,
    /// Widget at the node's render slot (value widget, panel entry or
    /// division container).
    pub(crate) widget: Option<WidgetHandle>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(guid: String, display_name: String, kind: NodeKind) -> Self {
        Self {
            guid,
            display_name,
            strict_guid: true,
            priority: PRIORITY_DEFAULT,
            parent: None,
            state: VisibilityState::default(),
            bridged: false,
            bridged_by: None,
            widget: None,
            kind,
        }
    }

    pub(crate) fn panel(guid: String, display_name: String, inline: bool) -> Self {
        Self::new(
            guid,
            display_name,
            NodeKind::Panel(PanelData {
                children: Vec::new(),
                inline,
                screen: None,
                materialized: Vec::new(),
            }),
        )
    }

    pub(crate) fn as_panel(&self) -> Option<&PanelData> {
        match &self.kind {
            NodeKind::Panel(p) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn as_panel_mut(&mut self) -> Option<&mut PanelData> {
        match &mut self.kind {
            NodeKind::Panel(p) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn as_value(&self) -> Option<&ValueField> {
        match &self.kind {
            NodeKind::Value(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn as_value_mut(&mut self) -> Option<&mut ValueField> {
        match &mut self.kind {
            NodeKind::Value(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn is_division(&self) -> bool {
        matches!(&self.kind, NodeKind::Panel(p) if p.inline)
    }

    pub(crate) fn is_concrete_panel(&self) -> bool {
        matches!(&self.kind, NodeKind::Panel(p) if !p.inline)
    }

    /// Whether preset switches reload this node.
    pub(crate) fn is_persisted(&self) -> bool {
        matches!(&self.kind, NodeKind::Value(v) if v.save_to_config)
    }

    pub(crate) fn category(&self) -> FieldCategory {
        match &self.kind {
            NodeKind::Panel(p) if p.inline => FieldCategory::Division,
            NodeKind::Panel(_) => FieldCategory::Panel,
            NodeKind::Bridge { .. } => FieldCategory::Bridge,
            NodeKind::Value(_) => FieldCategory::Value,
            NodeKind::Button { .. } => FieldCategory::Button,
            NodeKind::Header => FieldCategory::Header,
        }
    }
}

/// Structural category of a field, for hosts and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    Panel,
    Division,
    Bridge,
    Value,
    Button,
    Header,
}

/// Declarative description of a value field.
///
/// Modifiers that do not apply to the field's kind are ignored.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub guid: String,
    pub display_name: String,
    pub kind: ValueKind,
    pub default: Value,
    pub save_to_config: bool,
    pub priority: Priority,
    pub strict_guid: bool,
    pub hidden: bool,
    pub interactable: bool,
}

impl FieldSpec {
    pub fn new(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        kind: ValueKind,
        default: Value,
    ) -> Self {
        Self {
            guid: guid.into(),
            display_name: display_name.into(),
            kind,
            default,
            save_to_config: true,
            priority: PRIORITY_DEFAULT,
            strict_guid: true,
            hidden: false,
            interactable: true,
        }
    }

    pub fn bool(guid: impl Into<String>, display_name: impl Into<String>, default: bool) -> Self {
        Self::new(guid, display_name, ValueKind::Bool, Value::Bool(default))
    }

    pub fn int(guid: impl Into<String>, display_name: impl Into<String>, default: i64) -> Self {
        Self::new(
            guid,
            display_name,
            ValueKind::Int {
                bounds: None,
                display: NumberDisplay::Input,
            },
            Value::Int(default),
        )
    }

    pub fn float(guid: impl Into<String>, display_name: impl Into<String>, default: f64) -> Self {
        Self::new(
            guid,
            display_name,
            ValueKind::Float {
                bounds: None,
                decimals: None,
                display: NumberDisplay::Input,
            },
            Value::Float(default),
        )
    }

    pub fn text(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self::new(
            guid,
            display_name,
            ValueKind::Text {
                multiline: false,
                allow_empty: true,
            },
            Value::Text(default.into()),
        )
    }

    pub fn multiline_text(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self::new(
            guid,
            display_name,
            ValueKind::Text {
                multiline: true,
                allow_empty: true,
            },
            Value::Text(default.into()),
        )
    }

    pub fn enumeration<I, S>(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        members: I,
        default: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            guid,
            display_name,
            ValueKind::Enum {
                members: members.into_iter().map(Into::into).collect(),
            },
            Value::Enum(default.into()),
        )
    }

    pub fn color(guid: impl Into<String>, display_name: impl Into<String>, default: Color) -> Self {
        Self::new(guid, display_name, ValueKind::Color, Value::Color(default))
    }

    pub fn keybinding(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        default: KeyCode,
    ) -> Self {
        Self::new(guid, display_name, ValueKind::Key, Value::Key(default))
    }

    pub fn string_list<I, S>(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        values: I,
        default: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            guid,
            display_name,
            ValueKind::StringList {
                values: values.into_iter().map(Into::into).collect(),
            },
            Value::Text(default.into()),
        )
    }

    pub fn formatted(
        guid: impl Into<String>,
        display_name: impl Into<String>,
        default: RichText,
    ) -> Self {
        Self::new(guid, display_name, ValueKind::Formatted, Value::Formatted(default))
    }

    /// Inclusive bounds for int fields (clamping).
    pub fn int_range(mut self, min: i64, max: i64) -> Self {
        if let ValueKind::Int { bounds, .. } = &mut self.kind {
            *bounds = Some(Bounds::new(min, max, BoundsPolicy::Clamp));
        }
        self
    }

    /// Inclusive bounds for float fields (clamping).
    pub fn float_range(mut self, min: f64, max: f64) -> Self {
        if let ValueKind::Float { bounds, .. } = &mut self.kind {
            *bounds = Some(Bounds::new(min, max, BoundsPolicy::Clamp));
        }
        self
    }

    /// Refuse out-of-range input instead of clamping.
    pub fn reject_out_of_range(mut self) -> Self {
        match &mut self.kind {
            ValueKind::Int { bounds: Some(b), .. } => b.policy = BoundsPolicy::Reject,
            ValueKind::Float { bounds: Some(b), .. } => b.policy = BoundsPolicy::Reject,
            _ => {}
        }
        self
    }

    pub fn slider(mut self) -> Self {
        match &mut self.kind {
            ValueKind::Int { display, .. } | ValueKind::Float { display, .. } => {
                *display = NumberDisplay::Slider
            }
            _ => {}
        }
        self
    }

    pub fn decimals(mut self, places: u32) -> Self {
        if let ValueKind::Float { decimals, .. } = &mut self.kind {
            *decimals = Some(places);
        }
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        if let ValueKind::Text { allow_empty, .. } = &mut self.kind {
            *allow_empty = allow;
        }
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Keep the value in memory only.
    pub fn not_saved(mut self) -> Self {
        self.save_to_config = false;
        self
    }

    /// Exclude this guid from duplicate diagnostics.
    pub fn loose_guid(mut self) -> Self {
        self.strict_guid = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.interactable = false;
        self
    }
}

/// Whether a guid can be written as a single store key line.
pub(crate) fn is_valid_guid(guid: &str) -> bool {
    !guid.is_empty() && !guid.contains(['\n', '\r'])
}
