//! On-disk layout for one configurator.
//!
//! ```text
//! <config_dir>/<guid>.config                      default store
//! <config_dir>/<guid>_presets/config.txt          preset index
//! <config_dir>/<guid>_presets/<file_id>.config    preset stores
//! <config_dir>/<guid>_presets/exports/<name>.config
//! ```

use std::path::{Path, PathBuf};

/// Extension shared by every store file.
pub const STORE_EXTENSION: &str = "config";

/// File name of the preset index inside the presets directory.
pub const INDEX_FILENAME: &str = "config.txt";

/// Name of the exports folder inside the presets directory.
pub const EXPORTS_DIRNAME: &str = "exports";

/// Computes every path a configurator reads or writes. No filesystem I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    root: PathBuf,
    guid: String,
}

impl ConfigLayout {
    pub fn new(root: impl Into<PathBuf>, guid: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            guid: guid.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn default_store(&self) -> PathBuf {
        self.root.join(format!("{}.{}", self.guid, STORE_EXTENSION))
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.root.join(format!("{}_presets", self.guid))
    }

    pub fn index_file(&self) -> PathBuf {
        self.presets_dir().join(INDEX_FILENAME)
    }

    pub fn preset_store(&self, file_id: &str) -> PathBuf {
        self.presets_dir().join(format!("{}.{}", file_id, STORE_EXTENSION))
    }

    /// Store path for a selection: `None` is the default store.
    pub fn store_for(&self, file_id: Option<&str>) -> PathBuf {
        match file_id {
            Some(id) => self.preset_store(id),
            None => self.default_store(),
        }
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.presets_dir().join(EXPORTS_DIRNAME)
    }
}

/// File stem of a `*.config` path, if it has that extension.
pub fn store_stem(path: &Path) -> Option<&str> {
    if path.extension()?.to_str()? != STORE_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()
}
