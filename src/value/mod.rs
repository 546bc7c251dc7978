//! Typed field values and their validation/serialization rules.
//!
//! Every value field carries a [`ValueKind`] (the kind plus its validation
//! parameters) and a [`Value`]. All per-kind behavior lives in the exhaustive
//! matches below.

pub mod event;
pub mod rich_text;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Color, KeyCode};

pub use event::{ChangeEvent, ChangeHandler, ChangeOrigin, ChangeOutcome, ClickHandler};
pub use rich_text::{RichText, RichTextError, TextRun, TextStyle};

/// Stands in for `\n` inside persisted multi-line strings.
pub const NEWLINE_SENTINEL: char = '\u{F8FF}';

/// What happens to numeric input outside the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Snap to the nearest bound.
    #[default]
    Clamp,
    /// Refuse the input.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
    pub policy: BoundsPolicy,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: T, max: T, policy: BoundsPolicy) -> Self {
        Self { min, max, policy }
    }

    pub fn contains(&self, v: T) -> bool {
        v >= self.min && v <= self.max
    }

    /// Apply the policy: `Some` with the accepted value, `None` if rejected.
    fn apply(&self, v: T) -> Option<T> {
        if self.contains(v) {
            return Some(v);
        }
        match self.policy {
            BoundsPolicy::Reject => None,
            BoundsPolicy::Clamp if v < self.min => Some(self.min),
            BoundsPolicy::Clamp => Some(self.max),
        }
    }
}

/// Widget hint for numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberDisplay {
    #[default]
    Input,
    Slider,
}

/// Kind of a value field plus its validation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Int {
        bounds: Option<Bounds<i64>>,
        display: NumberDisplay,
    },
    Float {
        bounds: Option<Bounds<f64>>,
        decimals: Option<u32>,
        display: NumberDisplay,
    },
    Text {
        multiline: bool,
        allow_empty: bool,
    },
    Enum {
        members: Vec<String>,
    },
    Color,
    Key,
    StringList {
        values: Vec<String>,
    },
    Formatted,
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Text and string-list values.
    Text(String),
    /// Enum member name.
    Enum(String),
    Color(Color),
    Key(KeyCode),
    Formatted(RichText),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Enum(_) => "enum",
            Value::Color(_) => "color",
            Value::Key(_) => "key",
            Value::Formatted(_) => "formatted",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text, string-list and enum values as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<KeyCode> {
        match self {
            Value::Key(k) => Some(*k),
            _ => None,
        }
    }

    pub fn as_rich_text(&self) -> Option<&RichText> {
        match self {
            Value::Formatted(r) => Some(r),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<KeyCode> for Value {
    fn from(v: KeyCode) -> Self {
        Value::Key(v)
    }
}

impl From<RichText> for Value {
    fn from(v: RichText) -> Self {
        Value::Formatted(v)
    }
}

/// Result of loading a persisted string into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub value: Value,
    /// The stored string differs from what `value` serializes to and should
    /// be overwritten.
    pub repaired: bool,
}

fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (v * factor).round() / factor
}

fn check_members(guid: &str, members: &[String], what: &str) -> ConfigResult<()> {
    if members.is_empty() {
        return Err(ConfigError::invalid_schema(guid, format!("{} set is empty", what)));
    }
    let mut seen = HashSet::new();
    for member in members {
        if member.is_empty() || member.contains(['\n', '\r']) {
            return Err(ConfigError::invalid_schema(
                guid,
                format!("{} '{}' must be non-empty and single-line", what, member.escape_debug()),
            ));
        }
        if !seen.insert(member.as_str()) {
            return Err(ConfigError::invalid_schema(
                guid,
                format!("duplicate {} '{}'", what, member),
            ));
        }
    }
    Ok(())
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int { .. } => "int",
            ValueKind::Float { .. } => "float",
            ValueKind::Text { .. } => "text",
            ValueKind::Enum { .. } => "enum",
            ValueKind::Color => "color",
            ValueKind::Key => "key",
            ValueKind::StringList { .. } => "string_list",
            ValueKind::Formatted => "formatted",
        }
    }

    /// Whether `value` has the variant this kind stores.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueKind::Bool, Value::Bool(_))
                | (ValueKind::Int { .. }, Value::Int(_))
                | (ValueKind::Float { .. }, Value::Float(_))
                | (ValueKind::Text { .. }, Value::Text(_))
                | (ValueKind::Enum { .. }, Value::Enum(_))
                | (ValueKind::Color, Value::Color(_))
                | (ValueKind::Key, Value::Key(_))
                | (ValueKind::StringList { .. }, Value::Text(_))
                | (ValueKind::Formatted, Value::Formatted(_))
        )
    }

    /// Wire form of a value. The result never contains line breaks.
    pub fn serialize(&self, value: &Value) -> String {
        match (self, value) {
            (ValueKind::Text { multiline: true, .. }, Value::Text(s)) => s
                .chars()
                .filter(|c| *c != '\r')
                .map(|c| if c == '\n' { NEWLINE_SENTINEL } else { c })
                .collect(),
            (_, Value::Bool(b)) => b.to_string(),
            (_, Value::Int(i)) => i.to_string(),
            (_, Value::Float(f)) => f.to_string(),
            (_, Value::Text(s)) | (_, Value::Enum(s)) => crate::store::strip_line_breaks(s),
            (_, Value::Color(c)) => format!("{},{},{}", c.r, c.g, c.b),
            (_, Value::Key(k)) => k.name().to_string(),
            (_, Value::Formatted(r)) => r.single_line().to_markup(),
        }
    }

    /// Parse a wire string. `None` means malformed. Bounds and membership
    /// are checked separately by [`ValueKind::coerce`].
    pub fn parse(&self, raw: &str) -> Option<Value> {
        match self {
            ValueKind::Bool => {
                let raw = raw.trim();
                if raw.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            ValueKind::Int { .. } => raw.trim().parse().ok().map(Value::Int),
            ValueKind::Float { .. } => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            ValueKind::Text { multiline: true, .. } => Some(Value::Text(
                raw.chars()
                    .map(|c| if c == NEWLINE_SENTINEL { '\n' } else { c })
                    .collect(),
            )),
            ValueKind::Text { .. } => Some(Value::Text(raw.to_string())),
            ValueKind::Enum { .. } => Some(Value::Enum(raw.to_string())),
            ValueKind::Color => {
                let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
                if parts.len() != 3 {
                    return None;
                }
                let mut rgb = [0f32; 3];
                for (slot, part) in rgb.iter_mut().zip(&parts) {
                    *slot = part.parse::<f32>().ok().filter(|f| f.is_finite())?;
                }
                Some(Value::Color(Color::rgb(rgb[0], rgb[1], rgb[2])))
            }
            ValueKind::Key => raw.trim().parse::<KeyCode>().ok().map(Value::Key),
            ValueKind::StringList { .. } => Some(Value::Text(raw.to_string())),
            ValueKind::Formatted => RichText::parse(raw).ok().map(Value::Formatted),
        }
    }

    /// Parse user-typed input. Text kinds take the input verbatim; multi-line
    /// input keeps its real line breaks. Colors also accept `#RRGGBB`.
    pub fn parse_input(&self, raw: &str) -> Option<Value> {
        match self {
            ValueKind::Text { .. } => Some(Value::Text(raw.to_string())),
            ValueKind::Color => {
                let trimmed = raw.trim();
                if let Some(hex) = trimmed.strip_prefix('#') {
                    if hex.len() != 6 {
                        return None;
                    }
                    return u32::from_str_radix(hex, 16)
                        .ok()
                        .map(|h| Value::Color(Color::from_hex(h)));
                }
                self.parse(trimmed)
            }
            _ => self.parse(raw),
        }
    }

    /// Validate a candidate, applying clamping, rounding and line-break
    /// stripping. `Err` carries the rejection reason.
    pub fn coerce(&self, value: Value) -> Result<Value, String> {
        match (self, value) {
            (ValueKind::Bool, v @ Value::Bool(_)) => Ok(v),
            (ValueKind::Int { bounds, .. }, Value::Int(i)) => match bounds {
                Some(b) => b
                    .apply(i)
                    .map(Value::Int)
                    .ok_or_else(|| format!("{} is outside [{}, {}]", i, b.min, b.max)),
                None => Ok(Value::Int(i)),
            },
            (ValueKind::Float { bounds, decimals, .. }, Value::Float(f)) => {
                if !f.is_finite() {
                    return Err(format!("{} is not a finite number", f));
                }
                let f = match decimals {
                    Some(d) => round_to(f, *d),
                    None => f,
                };
                match bounds {
                    Some(b) => b
                        .apply(f)
                        .map(Value::Float)
                        .ok_or_else(|| format!("{} is outside [{}, {}]", f, b.min, b.max)),
                    None => Ok(Value::Float(f)),
                }
            }
            (ValueKind::Text { multiline, allow_empty }, Value::Text(s)) => {
                let s = if *multiline {
                    s.replace('\r', "")
                } else {
                    crate::store::strip_line_breaks(&s)
                };
                if s.is_empty() && !allow_empty {
                    return Err("value must not be empty".to_string());
                }
                Ok(Value::Text(s))
            }
            (ValueKind::Enum { members }, Value::Enum(name)) => {
                if members.iter().any(|m| *m == name) {
                    Ok(Value::Enum(name))
                } else {
                    Err(format!("'{}' is not a member", name))
                }
            }
            (ValueKind::Color, Value::Color(c)) => {
                if c.is_finite() {
                    Ok(Value::Color(c.clamped()))
                } else {
                    Err("color components must be finite".to_string())
                }
            }
            (ValueKind::Key, v @ Value::Key(_)) => Ok(v),
            (ValueKind::StringList { values }, Value::Text(s)) => {
                if values.iter().any(|v| *v == s) {
                    Ok(Value::Text(s))
                } else {
                    Err(format!("'{}' is not an allowed value", s))
                }
            }
            (ValueKind::Formatted, Value::Formatted(r)) => Ok(Value::Formatted(r.single_line())),
            (kind, value) => Err(format!(
                "expected {} value, got {}",
                kind.name(),
                value.type_name()
            )),
        }
    }

    /// Value used when a stored string cannot be loaded.
    pub fn fallback(&self, default: &Value) -> Value {
        match self {
            ValueKind::Key => Value::Key(KeyCode::None),
            _ => default.clone(),
        }
    }

    /// Load a stored string, falling back on malformed or invalid input.
    pub fn load(&self, raw: &str, default: &Value) -> Loaded {
        let loaded = self
            .parse(raw)
            .and_then(|v| self.coerce(v).ok());
        match loaded {
            Some(value) => {
                let repaired = self.serialize(&value) != raw;
                Loaded { value, repaired }
            }
            None => Loaded {
                value: self.fallback(default),
                repaired: true,
            },
        }
    }

    /// Text shown in a widget. Multi-line text keeps real line breaks.
    pub fn display(&self, value: &Value) -> String {
        match value {
            Value::Text(s) => s.clone(),
            Value::Formatted(r) => r.to_markup(),
            _ => self.serialize(value),
        }
    }

    /// Validate kind parameters and the default value at construction time.
    pub fn check_schema(&self, guid: &str, default: &Value) -> ConfigResult<()> {
        if !self.accepts(default) {
            return Err(ConfigError::type_mismatch(
                guid,
                self.name(),
                default.type_name(),
            ));
        }
        match self {
            ValueKind::Int { bounds, display } => {
                if let Some(b) = bounds
                    && b.min > b.max
                {
                    return Err(ConfigError::invalid_schema(
                        guid,
                        format!("min {} is greater than max {}", b.min, b.max),
                    ));
                }
                if bounds.is_none() && *display == NumberDisplay::Slider {
                    return Err(ConfigError::invalid_schema(guid, "slider requires bounds"));
                }
                if let (Some(b), Value::Int(d)) = (bounds, default)
                    && !b.contains(*d)
                {
                    return Err(ConfigError::invalid_schema(
                        guid,
                        format!("default {} is outside [{}, {}]", d, b.min, b.max),
                    ));
                }
            }
            ValueKind::Float {
                bounds, display, ..
            } => {
                if let Some(b) = bounds {
                    if !b.min.is_finite() || !b.max.is_finite() {
                        return Err(ConfigError::invalid_schema(guid, "bounds must be finite"));
                    }
                    if b.min > b.max {
                        return Err(ConfigError::invalid_schema(
                            guid,
                            format!("min {} is greater than max {}", b.min, b.max),
                        ));
                    }
                }
                if bounds.is_none() && *display == NumberDisplay::Slider {
                    return Err(ConfigError::invalid_schema(guid, "slider requires bounds"));
                }
                if let (Some(b), Value::Float(d)) = (bounds, default)
                    && !b.contains(*d)
                {
                    return Err(ConfigError::invalid_schema(
                        guid,
                        format!("default {} is outside [{}, {}]", d, b.min, b.max),
                    ));
                }
            }
            ValueKind::Enum { members } => check_members(guid, members, "member")?,
            ValueKind::StringList { values } => check_members(guid, values, "value")?,
            _ => {}
        }
        match self.coerce(default.clone()) {
            Ok(coerced) if coerced == *default => Ok(()),
            Ok(_) => Err(ConfigError::invalid_schema(
                guid,
                "default value is not in canonical form",
            )),
            Err(reason) => Err(ConfigError::invalid_schema(
                guid,
                format!("invalid default: {}", reason),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(min: i64, max: i64, policy: BoundsPolicy) -> ValueKind {
        ValueKind::Int {
            bounds: Some(Bounds::new(min, max, policy)),
            display: NumberDisplay::Input,
        }
    }

    fn float() -> ValueKind {
        ValueKind::Float {
            bounds: None,
            decimals: None,
            display: NumberDisplay::Input,
        }
    }

    #[test]
    fn test_bool_parse_is_lenient() {
        assert_eq!(ValueKind::Bool.parse(" True "), Some(Value::Bool(true)));
        assert_eq!(ValueKind::Bool.parse("yes"), None);
    }

    #[test]
    fn test_int_clamp_and_reject() {
        let clamp = int(0, 10, BoundsPolicy::Clamp);
        assert_eq!(clamp.coerce(Value::Int(42)), Ok(Value::Int(10)));
        assert_eq!(clamp.coerce(Value::Int(-3)), Ok(Value::Int(0)));

        let reject = int(0, 10, BoundsPolicy::Reject);
        assert!(reject.coerce(Value::Int(42)).is_err());
        assert_eq!(reject.coerce(Value::Int(7)), Ok(Value::Int(7)));
    }

    #[test]
    fn test_load_out_of_range_per_policy() {
        let default = Value::Int(5);
        let clamp = int(0, 10, BoundsPolicy::Clamp).load("99", &default);
        assert_eq!(clamp.value, Value::Int(10));
        assert!(clamp.repaired);

        let reject = int(0, 10, BoundsPolicy::Reject).load("99", &default);
        assert_eq!(reject.value, default);
        assert!(reject.repaired);
    }

    #[test]
    fn test_float_rejects_non_finite() {
        assert_eq!(float().parse("NaN"), None);
        assert_eq!(float().parse("inf"), None);
        assert_eq!(float().parse("0.25"), Some(Value::Float(0.25)));
    }

    #[test]
    fn test_float_rounding() {
        let kind = ValueKind::Float {
            bounds: None,
            decimals: Some(2),
            display: NumberDisplay::Input,
        };
        assert_eq!(kind.coerce(Value::Float(1.23456)), Ok(Value::Float(1.23)));
    }

    #[test]
    fn test_multiline_sentinel() {
        let kind = ValueKind::Text {
            multiline: true,
            allow_empty: true,
        };
        let wire = kind.serialize(&Value::Text("a\r\nb".to_string()));
        assert_eq!(wire, format!("a{}b", NEWLINE_SENTINEL));
        assert!(!wire.contains('\n'));
        assert_eq!(kind.parse(&wire), Some(Value::Text("a\nb".to_string())));
    }

    #[test]
    fn test_single_line_strips_breaks() {
        let kind = ValueKind::Text {
            multiline: false,
            allow_empty: true,
        };
        assert_eq!(
            kind.coerce(Value::Text("a\nb\r".to_string())),
            Ok(Value::Text("ab".to_string()))
        );
    }

    #[test]
    fn test_color_wire_form() {
        let wire = ValueKind::Color.serialize(&Value::Color(Color::rgb(1.0, 0.5, 0.0)));
        assert_eq!(wire, "1,0.5,0");
        assert_eq!(
            ValueKind::Color.parse("1, 0.5 ,0"),
            Some(Value::Color(Color::rgb(1.0, 0.5, 0.0)))
        );
        assert_eq!(ValueKind::Color.parse("1,0.5"), None);
        let loaded = ValueKind::Color.load("2,0,0", &Value::Color(Color::BLACK));
        assert_eq!(loaded.value, Value::Color(Color::rgb(1.0, 0.0, 0.0)));
        assert!(loaded.repaired);
    }

    #[test]
    fn test_color_hex_input() {
        assert_eq!(
            ValueKind::Color.parse_input("#FF0000"),
            Some(Value::Color(Color::rgb(1.0, 0.0, 0.0)))
        );
        assert_eq!(ValueKind::Color.parse_input("#FF00"), None);
    }

    #[test]
    fn test_key_fallback_is_none() {
        let loaded = ValueKind::Key.load("NotAKey", &Value::Key(KeyCode::F5));
        assert_eq!(loaded.value, Value::Key(KeyCode::None));
    }

    #[test]
    fn test_string_list_membership() {
        let kind = ValueKind::StringList {
            values: vec!["low".into(), "high".into()],
        };
        let default = Value::Text("low".into());
        assert_eq!(kind.load("gone", &default).value, default);
        assert!(!kind.load("high", &default).repaired);
    }

    #[test]
    fn test_schema_errors() {
        let bad_bounds = int(10, 0, BoundsPolicy::Clamp);
        assert!(bad_bounds.check_schema("x", &Value::Int(5)).is_err());

        let outside = int(0, 10, BoundsPolicy::Clamp);
        assert!(outside.check_schema("x", &Value::Int(11)).is_err());
        assert!(outside.check_schema("x", &Value::Bool(true)).is_err());

        let slider = ValueKind::Int {
            bounds: None,
            display: NumberDisplay::Slider,
        };
        assert!(slider.check_schema("x", &Value::Int(0)).is_err());

        let dup = ValueKind::Enum {
            members: vec!["A".into(), "A".into()],
        };
        assert!(dup.check_schema("x", &Value::Enum("A".into())).is_err());

        let empty = ValueKind::StringList { values: vec![] };
        assert!(empty.check_schema("x", &Value::Text(String::new())).is_err());

        let not_member = ValueKind::Enum {
            members: vec!["A".into()],
        };
        assert!(not_member.check_schema("x", &Value::Enum("B".into())).is_err());

        let no_empty = ValueKind::Text {
            multiline: false,
            allow_empty: false,
        };
        assert!(no_empty.check_schema("x", &Value::Text(String::new())).is_err());
    }

    #[test]
    fn test_wire_round_trip_every_kind() {
        let text = |multiline| ValueKind::Text {
            multiline,
            allow_empty: true,
        };
        let cases: Vec<(ValueKind, Value, &str, Option<&str>)> = vec![
            (ValueKind::Bool, Value::Bool(false), "true", Some("maybe")),
            (int(0, 10, BoundsPolicy::Clamp), Value::Int(0), "7", Some("seven")),
            (float(), Value::Float(0.0), "1.5", Some("abc")),
            (text(false), Value::Text(String::new()), "hello", None),
            (text(true), Value::Text(String::new()), "a\u{F8FF}b", None),
            (
                ValueKind::Enum {
                    members: vec!["Low".into(), "High".into()],
                },
                Value::Enum("Low".into()),
                "High",
                Some("Renamed"),
            ),
            (ValueKind::Color, Value::Color(Color::BLACK), "1,0.5,0", Some("red")),
            (ValueKind::Key, Value::Key(KeyCode::F5), "Space", Some("NotAKey")),
            (
                ValueKind::StringList {
                    values: vec!["a".into(), "b".into()],
                },
                Value::Text("a".into()),
                "b",
                Some("c"),
            ),
            (
                ValueKind::Formatted,
                Value::Formatted(RichText::new()),
                "<b>x</b>",
                Some("<u>x</u>"),
            ),
        ];

        for (kind, default, good, bad) in cases {
            let loaded = kind.load(good, &default);
            assert!(!loaded.repaired, "{} repaired {:?}", kind.name(), good);
            assert_eq!(kind.serialize(&loaded.value), good, "{}", kind.name());

            if let Some(bad) = bad {
                let loaded = kind.load(bad, &default);
                assert!(loaded.repaired, "{} accepted {:?}", kind.name(), bad);
                assert_eq!(loaded.value, kind.fallback(&default), "{}", kind.name());
            }
        }
    }

    #[test]
    fn test_non_canonical_wire_is_repaired_once() {
        let kind = float();
        let first = kind.load("1.50", &Value::Float(0.0));
        assert_eq!(first.value, Value::Float(1.5));
        assert!(first.repaired);
        let wire = kind.serialize(&first.value);
        assert_eq!(wire, "1.5");
        assert!(!kind.load(&wire, &Value::Float(0.0)).repaired);

        let int = int(0, 10, BoundsPolicy::Clamp);
        let padded = int.load(" 07", &Value::Int(0));
        assert_eq!(padded.value, Value::Int(7));
        assert_eq!(int.serialize(&padded.value), "7");
    }

    #[test]
    fn test_mismatched_coerce() {
        assert!(ValueKind::Bool.coerce(Value::Int(1)).is_err());
    }
}
