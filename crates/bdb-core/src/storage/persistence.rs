//! Database document persistence
//!
//! One JSON file per database under the data root. Every operation reads the
//! whole document, mutates it in memory, and rewrites the file. Writes go
//! through a temp file, fsync, and rename, so a crash mid-write leaves the
//! previous document intact rather than a half-written one.
//!
//! Also hosts the startup repair pass that rewrites unreadable documents.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::warn;

use crate::models::DatabaseDoc;
use crate::storage::error::{StorageError, StorageResult};

/// Load a database document from disk
///
/// Returns `None` if the file doesn't exist.
/// Returns `Corrupt` if the file exists but can't be parsed.
pub fn load_document(path: &Path) -> StorageResult<Option<DatabaseDoc>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StorageError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let doc = serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    Ok(Some(doc))
}

/// Write a database document to disk atomically
pub fn store_document(path: &Path, doc: &DatabaseDoc) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(doc).map_err(|e| StorageError::WriteError {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })?;

    atomic_write(path, json.as_bytes())
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync before rename so the rename never publishes a partial file
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;

    Ok(())
}

/// Self-heal the data root at startup
///
/// Every `.json` file that parses as neither a database document nor the
/// connection record (no `tables` key, no `api_key` key) is rewritten as an
/// empty database. Original content is discarded, not preserved. Failures
/// are logged and swallowed; the repair pass never aborts startup.
pub fn repair_data_root(data_dir: &Path) {
    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %data_dir.display(), error = %e, "repair skipped: cannot read data root");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if is_recognized_document(&path) {
            continue;
        }

        warn!(path = %path.display(), "rewriting unreadable document as an empty database");
        if let Err(e) = store_document(&path, &DatabaseDoc::empty()) {
            warn!(path = %path.display(), error = %e, "repair failed for file");
        }
    }
}

/// A file is recognized when it parses as JSON and carries either a `tables`
/// key (database) or an `api_key` key (connection record).
fn is_recognized_document(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .map(|value| value.get("tables").is_some() || value.get("api_key").is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Table;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        assert!(load_document(&path).unwrap().is_none());
    }

    #[test]
    fn test_store_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shop.json");

        let mut doc = DatabaseDoc::empty();
        doc.tables
            .insert("users".to_string(), Table::new(&["email".to_string()]));
        store_document(&path, &doc).unwrap();

        let loaded = load_document(&path).unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_load_corrupt_is_typed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{{{not json").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("file.json");

        atomic_write(&nested, b"{}").unwrap();

        assert!(nested.exists());
        assert_eq!(fs::read_to_string(&nested).unwrap(), "{}");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");

        atomic_write(&path, b"old").unwrap();
        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_repair_rewrites_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "this is not json at all").unwrap();

        repair_data_root(temp_dir.path());

        let doc = load_document(&path).unwrap().unwrap();
        assert_eq!(doc, DatabaseDoc::empty());
    }

    #[test]
    fn test_repair_rewrites_unrecognized_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stray.json");
        fs::write(&path, r#"{"something": "else"}"#).unwrap();

        repair_data_root(temp_dir.path());

        let doc = load_document(&path).unwrap().unwrap();
        assert_eq!(doc, DatabaseDoc::empty());
    }

    #[test]
    fn test_repair_leaves_valid_database_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("good.json");

        let mut doc = DatabaseDoc::empty();
        doc.tables.insert("logs".to_string(), Table::new(&[]));
        store_document(&path, &doc).unwrap();

        repair_data_root(temp_dir.path());

        assert_eq!(load_document(&path).unwrap().unwrap(), doc);
    }

    #[test]
    fn test_repair_leaves_connection_record_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bdb_config.json");
        let record = r#"{"host": "127.0.0.1", "port": "5000", "api_key": "bdb_abc"}"#;
        fs::write(&path, record).unwrap();

        repair_data_root(temp_dir.path());

        assert_eq!(fs::read_to_string(&path).unwrap(), record);
    }

    #[test]
    fn test_repair_ignores_non_json_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        fs::write(&path, "keep me").unwrap();

        repair_data_root(temp_dir.path());

        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_repair_on_missing_dir_is_silent() {
        let temp_dir = TempDir::new().unwrap();
        // Must not panic or error
        repair_data_root(&temp_dir.path().join("never-created"));
    }
}
