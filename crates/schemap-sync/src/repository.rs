//! File-system repository for mapping sets.
//!
//! Each mapping set is stored as pretty JSON named
//! `{source_id}__{target_id}.json`. ASCII alphanumerics, `.` and `-` are kept
//! as-is; every other byte, `_` included, is written as `_XX` in hex. An
//! escaped id never contains `__`, so distinct keys get distinct files.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use schemap_model::{FieldMapping, MappingKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RepositoryError;

const FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// A mapping set with repository metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMappingSet {
    pub source_id: String,
    pub target_id: String,
    pub mappings: Vec<FieldMapping>,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl StoredMappingSet {
    pub fn new(key: &MappingKey, mappings: Vec<FieldMapping>) -> Self {
        Self {
            source_id: key.source_id.clone(),
            target_id: key.target_id.clone(),
            mappings,
            saved_at: Utc::now(),
            description: None,
            version: default_version(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn key(&self) -> MappingKey {
        MappingKey::new(&self.source_id, &self.target_id)
    }
}

/// Summary of a stored mapping set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingMetadata {
    pub source_id: String,
    pub target_id: String,
    pub file_path: PathBuf,
    pub mapping_count: usize,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MappingRepository {
    base_dir: PathBuf,
}

impl MappingRepository {
    /// Opens a repository, creating `base_dir` if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .map_err(|source| RepositoryError::io("create", &base_dir, source))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn save(&self, key: &MappingKey, mappings: &[FieldMapping]) -> Result<PathBuf, RepositoryError> {
        self.save_stored(&StoredMappingSet::new(key, mappings.to_vec()))
    }

    pub fn save_stored(&self, stored: &StoredMappingSet) -> Result<PathBuf, RepositoryError> {
        let path = self.path_for(&stored.key());
        let json = serde_json::to_string_pretty(stored).map_err(|source| RepositoryError::Serialize {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| RepositoryError::io("write", &path, source))?;
        debug!(path = %path.display(), mapping_count = stored.mappings.len(), "saved mapping set");
        Ok(path)
    }

    /// Mappings stored for `key`, or `None` if nothing was saved.
    pub fn load(&self, key: &MappingKey) -> Result<Option<Vec<FieldMapping>>, RepositoryError> {
        Ok(self.load_stored(key)?.map(|stored| stored.mappings))
    }

    /// The stored set for `key`.
    ///
    /// A file whose recorded ids differ from `key` (written by hand, or on a
    /// case-insensitive file system) is treated as absent.
    pub fn load_stored(&self, key: &MappingKey) -> Result<Option<StoredMappingSet>, RepositoryError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let stored = read_stored(&path)?;
        if stored.key() != *key {
            warn!(
                path = %path.display(),
                requested = %key,
                found = %stored.key(),
                "mapping file belongs to a different key"
            );
            return Ok(None);
        }
        Ok(Some(stored))
    }

    /// Every readable mapping set, ordered by source then target id.
    ///
    /// Files that do not parse as a mapping set are skipped.
    pub fn list(&self) -> Result<Vec<MappingMetadata>, RepositoryError> {
        let entries = fs::read_dir(&self.base_dir)
            .map_err(|source| RepositoryError::io("read", &self.base_dir, source))?;

        let mut metadata = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| RepositoryError::io("read", &self.base_dir, source))?
                .path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_stored(&path) {
                Ok(stored) => metadata.push(MappingMetadata {
                    source_id: stored.source_id,
                    target_id: stored.target_id,
                    mapping_count: stored.mappings.len(),
                    saved_at: stored.saved_at,
                    file_path: path,
                }),
                Err(error) => warn!(path = %path.display(), %error, "skipping unreadable mapping file"),
            }
        }

        metadata.sort_by(|a, b| {
            a.source_id
                .cmp(&b.source_id)
                .then_with(|| a.target_id.cmp(&b.target_id))
        });
        Ok(metadata)
    }

    pub fn exists(&self, key: &MappingKey) -> bool {
        self.path_for(key).exists()
    }

    fn path_for(&self, key: &MappingKey) -> PathBuf {
        self.base_dir.join(format!(
            "{}__{}.json",
            escape_id(&key.source_id),
            escape_id(&key.target_id)
        ))
    }
}

fn read_stored(path: &Path) -> Result<StoredMappingSet, RepositoryError> {
    let contents = fs::read_to_string(path).map_err(|source| RepositoryError::io("read", path, source))?;
    serde_json::from_str(&contents).map_err(|source| RepositoryError::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}

/// Filename-safe, reversible form of an id.
fn escape_id(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'-' {
            escaped.push(char::from(byte));
        } else {
            let _ = write!(escaped, "_{byte:02X}");
        }
    }
    escaped
}
