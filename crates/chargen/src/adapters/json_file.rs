//! JSON file repository
//!
//! Stores the collection as one pretty-printed JSON array. Writes go to a
//! sibling `.tmp` file that is then renamed over the target, so a crash
//! mid-write never leaves a truncated collection behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::domain::{errors::DomainError, CharacterRecord};
use crate::ports::CharacterRepository;

const INDENT: &[u8] = b"    ";

/// Character repository backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Serialize records the way they are written to disk
pub fn to_pretty_json(records: &[CharacterRecord]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    records.serialize(&mut serializer)?;
    Ok(buf)
}

impl CharacterRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<CharacterRecord>, DomainError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No character file yet, starting empty");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| DomainError::repository_at(&self.path, format!("read failed: {}", e)))?;

        let records: Vec<CharacterRecord> = serde_json::from_str(&content).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Character file is not valid JSON");
            DomainError::repository_at(&self.path, format!("invalid character data: {}", e))
        })?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "Loaded characters");
        Ok(records)
    }

    fn save(&self, records: &[CharacterRecord]) -> Result<(), DomainError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                DomainError::repository_at(dir, format!("create directory failed: {}", e))
            })?;
        }

        let content = to_pretty_json(records)
            .map_err(|e| DomainError::repository_at(&self.path, format!("serialize failed: {}", e)))?;

        let temp = self.temp_path();
        fs::write(&temp, content)
            .map_err(|e| DomainError::repository_at(&temp, format!("write failed: {}", e)))?;
        fs::rename(&temp, &self.path)
            .map_err(|e| DomainError::repository_at(&self.path, format!("replace failed: {}", e)))?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "Saved characters");
        Ok(())
    }
}
