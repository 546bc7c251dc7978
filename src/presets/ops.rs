//! Preset operations on a live configurator.
//!
//! Switching replaces the active store wholesale and replays every persisted
//! field through its reload entry point, highest priority first.

use heck::ToKebabCase;
use petname::{Generator, Petnames};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::Preset;
use crate::configurator::Configurator;
use crate::error::{ConfigError, ConfigResult};
use crate::paths::{store_stem, STORE_EXTENSION};
use crate::store::Store;
use crate::types::FieldId;

/// Initial contents of a new preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresetSeed {
    /// Start empty; every field loads its default on first switch.
    #[default]
    Empty,
    /// Copy the active store.
    CopyActive,
}

impl Configurator {
    /// Presets in display order.
    pub fn presets(&self) -> Vec<Preset> {
        self.presets.ordered().into_iter().cloned().collect()
    }

    pub fn preset(&self, file_id: &str) -> Option<&Preset> {
        self.presets.get(file_id)
    }

    pub fn preset_exists(&self, file_id: &str) -> bool {
        self.presets.contains(file_id)
    }

    /// Active preset file id; `None` means the default store.
    pub fn active_preset(&self) -> Option<&str> {
        self.presets.active()
    }

    /// Whether the preset index has unsaved changes.
    pub fn is_preset_index_dirty(&self) -> bool {
        self.presets.is_dirty()
    }

    /// Create a preset and return its file id.
    pub fn add_preset(&mut self, name: &str, seed: PresetSeed) -> ConfigResult<String> {
        let file_id = self.generate_preset_id();
        let mut store = match seed {
            PresetSeed::Empty => Store::new(),
            PresetSeed::CopyActive => self.store.clone(),
        };
        store.write(&self.layout.preset_store(&file_id))?;
        self.presets.insert(file_id.clone(), name);
        self.flush_index()?;
        info!(file_id = %file_id, name = %name, "Added preset");
        Ok(file_id)
    }

    pub fn rename_preset(&mut self, file_id: &str, name: &str) -> ConfigResult<()> {
        if !self.presets.rename(file_id, name) {
            return Err(ConfigError::preset_not_found(file_id));
        }
        self.flush_index()?;
        Ok(())
    }

    /// Move a preset to `position` in display order.
    pub fn move_preset(&mut self, file_id: &str, position: usize) -> ConfigResult<()> {
        if !self.presets.move_to(file_id, position) {
            return Err(ConfigError::preset_not_found(file_id));
        }
        self.flush_index()?;
        Ok(())
    }

    /// Make `target` active (`None` = default store) and reload every
    /// persisted field from it.
    pub fn switch_preset(&mut self, target: Option<&str>) -> ConfigResult<()> {
        self.switch_preset_inner(target, false)
    }

    /// Restore `file_id` to field defaults, then return to the preset that
    /// was active before.
    pub fn reset_preset(&mut self, file_id: Option<&str>) -> ConfigResult<()> {
        let previous = self.presets.active().map(str::to_string);
        self.switch_preset_inner(file_id, true)?;
        self.switch_preset_inner(previous.as_deref(), false)?;
        info!(preset = file_id.unwrap_or("default"), "Reset preset to defaults");
        Ok(())
    }

    fn switch_preset_inner(
        &mut self,
        target: Option<&str>,
        force_defaults: bool,
    ) -> ConfigResult<()> {
        if let Some(id) = target
            && !self.presets.contains(id)
        {
            return Err(ConfigError::preset_not_found(id));
        }

        self.flush_store()?;
        self.store = Store::load(&self.layout.store_for(target));
        self.presets.set_active(target.map(str::to_string));
        self.presets.mark_dirty();

        for id in self.reload_order() {
            let guid = self.nodes[id.0].guid.clone();
            let raw = if force_defaults {
                None
            } else {
                self.store.get(&guid).map(str::to_string)
            };
            let result = match raw {
                Some(raw) => self.reload_from_string(id, &raw),
                None => self.reload_default(id),
            };
            if let Err(e) = result {
                warn!(guid = %guid, error = %e, "Failed to reload field");
            }
        }

        // Force the file into existence even when nothing changed.
        self.store.mark_dirty();
        self.flush()?;
        info!(preset = target.unwrap_or("default"), force_defaults, "Switched preset");
        Ok(())
    }

    /// Persisted fields by priority descending, registration order within
    /// a priority.
    pub(crate) fn reload_order(&self) -> Vec<FieldId> {
        let mut ids: Vec<FieldId> = (0..self.nodes.len())
            .map(FieldId)
            .filter(|id| self.nodes[id.0].is_persisted())
            .collect();
        ids.sort_by_key(|id| std::cmp::Reverse(self.nodes[id.0].priority));
        ids
    }

    /// Remove a preset record and its file. Deleting the active preset
    /// switches to the default store first.
    pub fn delete_preset(&mut self, file_id: &str) -> ConfigResult<()> {
        if !self.presets.contains(file_id) {
            return Err(ConfigError::preset_not_found(file_id));
        }
        if self.presets.active() == Some(file_id) {
            self.switch_preset(None)?;
        }
        self.presets.remove(file_id);
        let path = self.layout.preset_store(file_id);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Preset file already gone");
            }
            Err(e) => return Err(e.into()),
        }
        self.flush_index()?;
        info!(file_id = %file_id, "Deleted preset");
        Ok(())
    }

    /// Flag a preset for deletion on the next `commit_pending_deletes`.
    pub fn mark_preset_for_delete(&mut self, file_id: &str, marked: bool) -> ConfigResult<()> {
        if !self.presets.set_marked_for_delete(file_id, marked) {
            return Err(ConfigError::preset_not_found(file_id));
        }
        Ok(())
    }

    /// Delete every marked preset. Returns the deleted file ids.
    pub fn commit_pending_deletes(&mut self) -> ConfigResult<Vec<String>> {
        let pending = self.presets.pending_deletes();
        for file_id in &pending {
            self.delete_preset(file_id)?;
        }
        Ok(pending)
    }

    /// Write the active in-memory store to `exports/<name>.config`.
    ///
    /// The name is kebab-cased; an existing file gets a `-1`, `-2`, ...
    /// suffix. Returns the written path.
    pub fn export_active(&self, name: &str) -> ConfigResult<PathBuf> {
        let mut slug = name.to_kebab_case();
        if slug.is_empty() {
            slug = "export".to_string();
        }
        let dir = self.layout.exports_dir();
        let mut path = dir.join(format!("{}.{}", slug, STORE_EXTENSION));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("{}-{}.{}", slug, n, STORE_EXTENSION));
            n += 1;
        }
        let mut copy = self.store.clone();
        copy.write(&path)?;
        info!(path = %path.display(), "Exported active store");
        Ok(path)
    }

    /// Copy an external store file into the presets directory as a new
    /// preset named after the file. Returns the new file id.
    pub fn import_preset(&mut self, path: &Path) -> ConfigResult<String> {
        let content = std::fs::read_to_string(path)?;
        let mut store = Store::parse(&content);
        let name = store_stem(path)
            .or_else(|| path.file_stem().and_then(|s| s.to_str()))
            .unwrap_or("imported")
            .to_string();
        let file_id = self.generate_preset_id();
        store.write(&self.layout.preset_store(&file_id))?;
        self.presets.insert(file_id.clone(), &name);
        self.flush_index()?;
        info!(file_id = %file_id, source = %path.display(), "Imported preset");
        Ok(file_id)
    }

    /// Adopt `*.config` files in the presets directory that the index does
    /// not list. Returns the adopted file ids.
    pub fn discover_presets(&mut self) -> ConfigResult<Vec<String>> {
        let dir = self.layout.presets_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut found: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(|path| store_stem(&path).map(str::to_string))
            .filter(|stem| !stem.is_empty() && !self.presets.contains(stem))
            .collect();
        found.sort();

        for file_id in &found {
            self.presets.insert(file_id.clone(), file_id);
            info!(file_id = %file_id, "Discovered preset");
        }
        if !found.is_empty() {
            self.flush_index()?;
        }
        Ok(found)
    }

    /// Pick an unused petname id, with a timestamp fallback.
    fn generate_preset_id(&self) -> String {
        let taken = |id: &str| {
            self.presets.contains(id) || self.layout.preset_store(id).exists()
        };
        for _ in 0..16 {
            if let Some(id) = Petnames::medium().generate_one(self.id_words, "-")
                && !taken(&id)
            {
                return id;
            }
        }
        let base = format!("preset-{}", chrono::Utc::now().timestamp_millis());
        let mut id = base.clone();
        let mut n = 1;
        while taken(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        id
    }

    pub(crate) fn flush_index(&mut self) -> ConfigResult<bool> {
        Ok(self.presets.flush(&self.layout.index_file())?)
    }

    pub(crate) fn flush_store(&mut self) -> ConfigResult<bool> {
        let path = self.layout.store_for(self.presets.active());
        Ok(self.store.flush(&path)?)
    }
}
