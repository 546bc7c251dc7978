//! Preset index: the list of named alternate stores and the active choice.
//!
//! Index file format (`<guid>_presets/config.txt`):
//!
//! ```text
//! <active file id, empty for the default store>
//! <file id>
//! <name>
//! <order index>
//! ...
//! ```

pub mod ops;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::store::strip_line_breaks;

pub use ops::PresetSeed;

/// One named preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// User-facing label.
    pub name: String,
    /// Stable identifier, also the store file stem.
    pub file_id: String,
    pub order_index: i64,
    /// Pending deletion, applied by `commit_pending_deletes`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub marked_for_delete: bool,
}

/// Ordered preset records plus the active selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetIndex {
    presets: Vec<Preset>,
    active: Option<String>,
    dirty: bool,
}

impl PresetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse index text.
    ///
    /// Entries with an unparseable order index are appended after the
    /// current maximum. An active id missing from the list selects the
    /// default store and marks the index dirty.
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines();
        let active = lines.next().filter(|l| !l.is_empty()).map(str::to_string);

        let mut presets = Vec::new();
        let mut unordered = Vec::new();
        let mut dirty = false;
        loop {
            let file_id = match lines.next() {
                Some(id) if !id.is_empty() => id,
                _ => break,
            };
            let Some(name) = lines.next() else {
                break;
            };
            if presets.iter().any(|p: &Preset| p.file_id == file_id) {
                lines.next();
                dirty = true;
                continue;
            }
            let order = lines.next().and_then(|raw| raw.trim().parse::<i64>().ok());
            if order.is_none() {
                unordered.push(presets.len());
                dirty = true;
            }
            presets.push(Preset {
                name: name.to_string(),
                file_id: file_id.to_string(),
                order_index: order.unwrap_or(0),
                marked_for_delete: false,
            });
        }

        let mut next = presets
            .iter()
            .enumerate()
            .filter(|(i, _)| !unordered.contains(i))
            .map(|(_, p)| p.order_index)
            .max()
            .map_or(0, |m| m + 1);
        for i in unordered {
            presets[i].order_index = next;
            next += 1;
        }

        let active = match active {
            Some(id) if presets.iter().any(|p| p.file_id == id) => Some(id),
            Some(id) => {
                warn!(file_id = %id, "Active preset is not in the index, using default");
                dirty = true;
                None
            }
            None => None,
        };

        Self {
            presets,
            active,
            dirty,
        }
    }

    /// Report format problems without altering what `parse` would load.
    pub fn check(content: &str) -> Vec<ParseError> {
        let mut problems = Vec::new();
        let lines: Vec<&str> = content.lines().collect();
        let mut i = 1;
        while i < lines.len() && !lines[i].is_empty() {
            if i + 2 >= lines.len() {
                problems.push(ParseError::TruncatedPreset { line: i + 1 });
                break;
            }
            let raw = lines[i + 2];
            if raw.trim().parse::<i64>().is_err() {
                problems.push(ParseError::BadOrderIndex {
                    line: i + 3,
                    raw: raw.to_string(),
                });
            }
            i += 3;
        }
        problems
    }

    /// Load the index file. A missing file yields an empty index.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let index = Self::parse(&content);
                debug!(path = %path.display(), presets = index.len(), "Loaded preset index");
                index
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::new(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Preset index unreadable, starting empty"
                );
                Self::new()
            }
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(self.active.as_deref().unwrap_or(""));
        out.push('\n');
        for preset in self.ordered() {
            out.push_str(&preset.file_id);
            out.push('\n');
            out.push_str(&preset.name);
            out.push('\n');
            out.push_str(&preset.order_index.to_string());
            out.push('\n');
        }
        out
    }

    pub fn write(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        std::fs::write(path, self.to_text())
            .with_context(|| format!("Failed to write preset index to {:?}", path))?;
        self.dirty = false;
        debug!(path = %path.display(), presets = self.len(), "Wrote preset index");
        Ok(())
    }

    /// Write only if dirty. Returns whether a write happened.
    pub fn flush(&mut self, path: &Path) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.write(path)?;
        Ok(true)
    }

    /// Presets sorted by order index; ties keep insertion order.
    pub fn ordered(&self) -> Vec<&Preset> {
        let mut sorted: Vec<&Preset> = self.presets.iter().collect();
        sorted.sort_by_key(|p| p.order_index);
        sorted
    }

    pub fn get(&self, file_id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.file_id == file_id)
    }

    fn get_mut(&mut self, file_id: &str) -> Option<&mut Preset> {
        self.presets.iter_mut().find(|p| p.file_id == file_id)
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.get(file_id).is_some()
    }

    /// Active preset file id; `None` is the default store.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_active(&mut self, file_id: Option<String>) {
        if self.active != file_id {
            self.active = file_id;
            self.dirty = true;
        }
    }

    /// Append a preset after the current last one.
    pub fn insert(&mut self, file_id: impl Into<String>, name: &str) -> &Preset {
        let order_index = self
            .presets
            .iter()
            .map(|p| p.order_index)
            .max()
            .map_or(0, |m| m + 1);
        self.presets.push(Preset {
            name: strip_line_breaks(name),
            file_id: file_id.into(),
            order_index,
            marked_for_delete: false,
        });
        self.dirty = true;
        &self.presets[self.presets.len() - 1]
    }

    /// Remove a record. Clears the active selection if it pointed here.
    pub fn remove(&mut self, file_id: &str) -> Option<Preset> {
        let pos = self.presets.iter().position(|p| p.file_id == file_id)?;
        if self.active.as_deref() == Some(file_id) {
            self.active = None;
        }
        self.dirty = true;
        Some(self.presets.remove(pos))
    }

    /// Returns false when the preset is unknown.
    pub fn rename(&mut self, file_id: &str, name: &str) -> bool {
        let name = strip_line_breaks(name);
        let Some(preset) = self.get_mut(file_id) else {
            return false;
        };
        if preset.name != name {
            preset.name = name;
            self.dirty = true;
        }
        true
    }

    /// Move a preset to `position` in display order and renumber all
    /// presets contiguously from zero.
    pub fn move_to(&mut self, file_id: &str, position: usize) -> bool {
        let mut ids: Vec<String> = self.ordered().iter().map(|p| p.file_id.clone()).collect();
        let Some(from) = ids.iter().position(|id| id == file_id) else {
            return false;
        };
        let id = ids.remove(from);
        ids.insert(position.min(ids.len()), id);
        for (order, id) in ids.iter().enumerate() {
            if let Some(preset) = self.get_mut(id) {
                preset.order_index = order as i64;
            }
        }
        self.dirty = true;
        true
    }

    pub fn set_marked_for_delete(&mut self, file_id: &str, marked: bool) -> bool {
        match self.get_mut(file_id) {
            Some(preset) => {
                preset.marked_for_delete = marked;
                true
            }
            None => false,
        }
    }

    /// File ids marked for deletion, in display order.
    pub fn pending_deletes(&self) -> Vec<String> {
        self.ordered()
            .into_iter()
            .filter(|p| p.marked_for_delete)
            .map(|p| p.file_id.clone())
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
