//! Line-based key/value store backing one set of persisted values.
//!
//! File format: lines alternating `key`, `value`, `key`, `value`, ...
//! An empty or missing key line ends parsing; everything after it is ignored.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ParseError;

/// In-memory guid -> serialized value map with dirty tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse store text. Stops at the first empty key line.
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut lines = content.lines();
        loop {
            let key = match lines.next() {
                Some(key) if !key.is_empty() => key,
                _ => break,
            };
            let Some(value) = lines.next() else {
                break;
            };
            entries.insert(key.to_string(), value.to_string());
        }
        Self {
            entries,
            dirty: false,
        }
    }

    /// Load a store file. Missing or unreadable files yield an empty store.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let store = Self::parse(&content);
                debug!(path = %path.display(), entries = store.len(), "Loaded store");
                store
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Store file missing, starting empty");
                Self::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Store file unreadable, starting empty");
                Self::new()
            }
        }
    }

    /// Report format problems without altering what `parse` would load.
    pub fn check(content: &str) -> Vec<ParseError> {
        let mut problems = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let lines: Vec<&str> = content.lines().collect();
        let mut i = 0;
        while i < lines.len() {
            let key = lines[i];
            if key.is_empty() {
                if lines[i..].iter().any(|l| !l.is_empty()) {
                    problems.push(ParseError::EmptyKey { line: i + 1 });
                }
                break;
            }
            if i + 1 >= lines.len() {
                problems.push(ParseError::MissingValue {
                    line: i + 1,
                    key: key.to_string(),
                });
                break;
            }
            if !seen.insert(key) {
                problems.push(ParseError::DuplicateKey {
                    line: i + 1,
                    key: key.to_string(),
                });
            }
            i += 2;
        }
        problems
    }

    /// Serialize to the alternating-line wire format.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('\n');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Write the store to disk unconditionally and clear the dirty flag.
    pub fn write(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        std::fs::write(path, self.to_text())
            .with_context(|| format!("Failed to write store to {:?}", path))?;
        self.dirty = false;
        debug!(path = %path.display(), entries = self.len(), "Wrote store");
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

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace an entry, marking the store dirty when it changes.
    ///
    /// Line breaks are stripped so one entry always occupies two lines.
    pub fn set(&mut self, key: &str, value: &str) {
        let value = strip_line_breaks(value);
        if self.entries.get(key).is_some_and(|v| *v == value) {
            return;
        }
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub(crate) fn strip_line_breaks(value: &str) -> String {
    if value.contains(['\n', '\r']) {
        value.chars().filter(|c| *c != '\n' && *c != '\r').collect()
    } else {
        value.to_string()
    }
}
