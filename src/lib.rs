//! settings-tree: an embeddable configuration-schema engine.
//!
//! Hosts build a tree of typed fields grouped into panels, backed by a
//! line-based key/value store with switchable presets. Rendering is left to
//! the host through the [`render::UiHost`] trait.

pub mod cli;
pub mod config;
pub mod configurator;
pub mod error;
pub mod format;
pub mod logging;
pub mod paths;
pub mod presets;
pub mod render;
pub mod store;
pub mod tree;
pub mod types;
pub mod value;

pub use config::{EngineConfig, GuidPolicy};
pub use configurator::{Configurator, LifecycleEvent};
pub use error::{ConfigError, ConfigResult, ErrorCode};
pub use presets::{Preset, PresetSeed};
pub use render::{UiHost, WidgetKind, WidgetRequest};
pub use tree::{Effective, FieldCategory, FieldSpec};
pub use types::{Color, FieldId, KeyCode, Priority, WidgetHandle};
pub use value::{
    BoundsPolicy, ChangeEvent, ChangeOrigin, ChangeOutcome, NumberDisplay, RichText, TextStyle,
    Value, ValueKind,
};
