//! JSON snapshots of a whole store
//!
//! Plain serialization of every table's rows. There is no migration between
//! schema versions; `version` is informational.

use crate::error::StoreResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Exported table contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version the rows were exported from
    #[serde(default)]
    pub version: u32,
    /// Rows per table
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<Value>>,
}

impl Snapshot {
    /// Add a table's rows
    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    /// Total number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Read a snapshot file
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not a snapshot.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            tables = snapshot.tables.len(),
            rows = snapshot.row_count(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write the snapshot, replacing `path` atomically
    ///
    /// # Errors
    /// Fails if the temporary file cannot be written or renamed.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        file.persist(path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), rows = self.row_count(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let snapshot = Snapshot::default().with_table("sales", vec![json!({"id": "s1"})]);

        snapshot.save(&path).unwrap();
        assert_eq!(Snapshot::load(&path).unwrap(), snapshot);
    }

    #[test]
    fn missing_fields_default() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.row_count(), 0);
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Snapshot::load(&path).is_err());
    }
}
