use super::backend::KvBackend;
use crate::error::{GrimoireError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend: one JSON document per key inside the database directory.
///
/// ```text
/// <data_dir>/<database>/
/// ├── collections.json
/// ├── entries.json
/// └── settings.json
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(data_dir: impl AsRef<Path>, database: &str) -> Self {
        Self {
            root: data_dir.as_ref().join(database),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(GrimoireError::Store(format!("Invalid key: {:?}", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(GrimoireError::Io)?;
        }
        Ok(())
    }
}

impl KvBackend for FsBackend {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(GrimoireError::Io)?;
        let value = serde_json::from_str(&content).map_err(GrimoireError::Serialization)?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.key_path(key)?;
        self.ensure_dir()?;

        let content = serde_json::to_string_pretty(value).map_err(GrimoireError::Serialization)?;

        // Atomic write
        let tmp_path = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(GrimoireError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(GrimoireError::Io(e));
        }
        Ok(())
    }
}
