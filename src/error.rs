//! Structured error types for schema construction, value changes and persistence.

use serde::Serialize;
use std::fmt;

use crate::types::FieldId;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Schema errors (host programming mistakes)
    InvalidSchema,
    InvalidGuid,
    DuplicateGuid,
    NotAPanel,
    AlreadyBridged,
    InvalidBridgeTarget,

    // Value errors
    InvalidFieldValue,
    TypeMismatch,
    NotAValueField,

    // Not found errors
    FieldNotFound,
    PresetNotFound,

    // Persistence errors
    IoError,
    InternalError,
}

/// Structured error carried through the public API.
#[derive(Debug, Serialize)]
pub struct ConfigError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

impl ConfigError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            guid: None,
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    // Convenience constructors

    pub fn invalid_schema(guid: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidSchema,
            format!("Invalid schema for '{}': {}", guid, reason),
        )
        .with_guid(guid)
    }

    pub fn invalid_guid(guid: &str) -> Self {
        Self::new(
            ErrorCode::InvalidGuid,
            format!("Guid '{}' must be non-empty and single-line", guid.escape_debug()),
        )
        .with_guid(guid)
    }

    pub fn duplicate_guid(guid: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateGuid,
            format!("Guid '{}' is already registered", guid),
        )
        .with_guid(guid)
    }

    pub fn not_a_panel(id: FieldId) -> Self {
        Self::new(ErrorCode::NotAPanel, format!("Field {} is not a panel", id))
    }

    pub fn already_bridged(guid: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyBridged,
            format!("Field '{}' is already bridged", guid),
        )
        .with_guid(guid)
    }

    pub fn invalid_bridge_target(reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidBridgeTarget,
            format!("Invalid bridge target: {}", reason),
        )
    }

    pub fn invalid_value(guid: &str, reason: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason.to_string()).with_guid(guid)
    }

    pub fn type_mismatch(guid: &str, expected: &str, got: &str) -> Self {
        Self::new(
            ErrorCode::TypeMismatch,
            format!("Field '{}' holds {} values, got {}", guid, expected, got),
        )
        .with_guid(guid)
    }

    pub fn not_a_value_field(id: FieldId) -> Self {
        Self::new(
            ErrorCode::NotAValueField,
            format!("Field {} does not hold a value", id),
        )
    }

    pub fn field_not_found(id: FieldId) -> Self {
        Self::new(ErrorCode::FieldNotFound, format!("Field not found: {}", id))
    }

    pub fn preset_not_found(file_id: &str) -> Self {
        Self::new(
            ErrorCode::PresetNotFound,
            format!("Preset not found: {}", file_id),
        )
    }

    pub fn io(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::IoError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::io(err)
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for ConfigError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConfigError>() {
            Ok(config_err) => config_err,
            Err(err) => match err.downcast::<std::io::Error>() {
                Ok(io_err) => ConfigError::io(io_err),
                Err(err) => ConfigError::internal(format!("{:#}", err)),
            },
        }
    }
}

/// Result type for configurator operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Low-level problems found while parsing persisted files.
///
/// Loading never fails on these (it truncates or falls back); they are
/// reported by [`crate::store::Store::check`] and the CLI `check` command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: empty key terminates the file early")]
    EmptyKey { line: usize },
    #[error("line {line}: key '{key}' has no value line")]
    MissingValue { line: usize, key: String },
    #[error("line {line}: duplicate key '{key}'")]
    DuplicateKey { line: usize, key: String },
    #[error("line {line}: order index '{raw}' is not a number")]
    BadOrderIndex { line: usize, raw: String },
    #[error("line {line}: preset entry is incomplete")]
    TruncatedPreset { line: usize },
}
