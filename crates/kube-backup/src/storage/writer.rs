use std::path::{Component, Path, PathBuf};

use serde_json::Value;

use super::path::{escape_path, resource_path};
use crate::error::StorageError;
use crate::resource::ResourceRecord;
use crate::selection::Scope;

/// Writes backup files below `<target>/<prefix>`.
pub struct TreeWriter {
    root: PathBuf,
}

impl TreeWriter {
    pub fn new<P: AsRef<Path>>(target: P, prefix: &str) -> Self {
        Self {
            root: target.as_ref().join(prefix),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a sanitized object as YAML and returns its relative path.
    pub fn write_resource(
        &self,
        record: &ResourceRecord,
        scope: Scope,
    ) -> Result<PathBuf, StorageError> {
        let relative = resource_path(record, scope);
        let yaml = record.to_yaml().map_err(|e| StorageError::Serialize {
            path: relative.clone(),
            message: e.to_string(),
        })?;
        self.write_raw(&relative, yaml.as_bytes())?;
        Ok(relative)
    }

    /// Writes a JSON document pretty-printed.
    pub fn write_json<P: AsRef<Path>>(
        &self,
        relative: P,
        value: &Value,
    ) -> Result<PathBuf, StorageError> {
        let relative = relative.as_ref();
        let mut content =
            serde_json::to_string_pretty(value).map_err(|e| StorageError::Serialize {
                path: relative.to_path_buf(),
                message: e.to_string(),
            })?;
        content.push('\n');
        self.write_raw(relative, content.as_bytes())?;
        Ok(relative.to_path_buf())
    }

    /// Writes bytes to a relative path, creating parent directories. Absolute
    /// paths and `..` components are rejected.
    pub fn write_raw<P: AsRef<Path>>(
        &self,
        relative: P,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let relative = PathBuf::from(escape_path(&relative.as_ref().to_string_lossy()));
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(StorageError::OutsideTree { path: relative });
        }
        let full_path = self.root.join(relative);

        if let Some(parent) = full_path.parent() {
            self.ensure_directory(parent)?;
        }

        std::fs::write(&full_path, content).map_err(|e| StorageError::WriteFile {
            path: full_path.clone(),
            source: e,
        })?;
        Ok(full_path)
    }

    /// Removes everything below the root except dot-entries such as `.git`,
    /// so objects deleted from the cluster disappear from the next commit.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.ensure_directory(&self.root)?;

        let entries = std::fs::read_dir(&self.root).map_err(|e| StorageError::ReadDirectory {
            path: self.root.clone(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::ReadDirectory {
                path: self.root.clone(),
                source: e,
            })?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let result = if is_dir {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            result.map_err(|e| StorageError::Remove { path, source: e })?;
        }

        Ok(())
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), StorageError> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}
