//! Storage engine
//!
//! The `Engine` is the single entry point: database, table, and row CRUD,
//! the connection record, and backups. It holds no state beyond its
//! configuration and the per-database lock registry; every operation opens,
//! mutates, and rewrites one JSON document.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = Engine::open(Config::load()?)?;
//!
//! engine.create_database("shop")?;
//! engine.create_table("shop", "customers", &["email".to_string()])?;
//! let id = engine.insert_row("shop", "customers", &fields)?;
//!
//! let (columns, rows) = engine.get_rows("shop", "customers")?;
//! ```

use std::fs;
use std::io;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::backup::{backup_file_name, BackupReport};
use crate::config::{Config, CONNECTION_FILE, DATABASE_EXT};
use crate::models::{ConnectionInfo, DatabaseDoc, Row, Table, ID_COLUMN};
use crate::seal::{field_is_sensitive, seal};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::locks::LockRegistry;
use crate::storage::persistence::{self, load_document, store_document};

/// The storage engine
///
/// All operations are synchronous whole-document read-modify-write cycles,
/// serialized per database name so concurrent callers cannot lose updates.
pub struct Engine {
    config: Config,
    locks: LockRegistry,
}

impl Engine {
    /// Open the engine against the configured roots
    ///
    /// Creates the data and backup directories, repairs damaged documents,
    /// and makes sure a connection record exists. No other operation runs
    /// before this has completed.
    pub fn open(config: Config) -> StorageResult<Self> {
        for dir in [&config.data_dir, &config.backup_dir] {
            fs::create_dir_all(dir).map_err(|e| StorageError::CreateDirectory {
                path: dir.clone(),
                source: e,
            })?;
        }

        persistence::repair_data_root(&config.data_dir);

        let engine = Self {
            config,
            locks: LockRegistry::new(),
        };

        // Bootstrap the connection record on first run
        engine.get_connection_info()?;

        Ok(engine)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Databases ====================

    /// Names of all databases in the data root
    ///
    /// The connection record does not count as a database. Order follows
    /// directory enumeration and is platform-dependent.
    pub fn list_databases(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.config.data_dir).map_err(|e| StorageError::ReadError {
            path: self.config.data_dir.clone(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::ReadError {
                path: self.config.data_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DATABASE_EXT) {
                continue;
            }
            if entry.file_name().to_str() == Some(CONNECTION_FILE) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }

        Ok(names)
    }

    /// Create an empty database
    ///
    /// Fails with `DatabaseExists` rather than clobbering an existing file.
    pub fn create_database(&self, name: &str) -> StorageResult<()> {
        validate_database_name(name)?;

        let lock = self.locks.for_database(name);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.config.database_path(name);
        if path.exists() {
            return Err(StorageError::DatabaseExists {
                name: name.to_string(),
            });
        }

        store_document(&path, &DatabaseDoc::empty())?;
        info!(database = name, "created database");
        Ok(())
    }

    /// Delete a database by removing its file
    ///
    /// Deleting a database that does not exist is not an error.
    pub fn delete_database(&self, name: &str) -> StorageResult<()> {
        let lock = self.locks.for_database(name);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.config.database_path(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(database = name, "deleted database");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }

    // ==================== Tables ====================

    /// Names of all tables in a database
    pub fn list_tables(&self, db: &str) -> StorageResult<Vec<String>> {
        let lock = self.locks.for_database(db);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let doc = self.load_existing(db)?;
        Ok(doc.tables.keys().cloned().collect())
    }

    /// Create a table with the given extra columns after the synthetic `id`
    ///
    /// A table that already exists is left unchanged (first writer wins).
    pub fn create_table(&self, db: &str, table: &str, extra_columns: &[String]) -> StorageResult<()> {
        let lock = self.locks.for_database(db);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut doc = self.load_existing(db)?;
        if doc.tables.contains_key(table) {
            debug!(database = db, table, "table already exists, leaving it unchanged");
            return Ok(());
        }

        doc.tables.insert(table.to_string(), Table::new(extra_columns));
        store_document(&self.config.database_path(db), &doc)?;
        info!(database = db, table, "created table");
        Ok(())
    }

    /// Delete a table by removing its key from the database document
    ///
    /// Deleting a table that does not exist is not an error.
    pub fn delete_table(&self, db: &str, table: &str) -> StorageResult<()> {
        let lock = self.locks.for_database(db);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut doc = self.load_existing(db)?;
        if doc.tables.remove(table).is_some() {
            store_document(&self.config.database_path(db), &doc)?;
            info!(database = db, table, "deleted table");
        }
        Ok(())
    }

    // ==================== Rows ====================

    /// Columns and rows of a table
    ///
    /// Each row is projected positionally onto the declared columns; a
    /// column absent from a row reads as the empty string, and row keys
    /// beyond the declared columns are not returned.
    pub fn get_rows(&self, db: &str, table: &str) -> StorageResult<(Vec<String>, Vec<Vec<String>>)> {
        let lock = self.locks.for_database(db);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let doc = self.load_existing(db)?;
        let tbl = doc
            .tables
            .get(table)
            .ok_or_else(|| table_not_found(db, table))?;

        let rows = tbl
            .rows
            .iter()
            .map(|row| {
                tbl.columns
                    .iter()
                    .map(|column| row.get(column).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok((tbl.columns.clone(), rows))
    }

    /// Insert a row and return its assigned id
    ///
    /// Values for fields whose name contains `"pass"` are sealed before
    /// storage. Fields are stored as given otherwise, whether or not they
    /// are declared columns.
    pub fn insert_row(
        &self,
        db: &str,
        table: &str,
        fields: &[(String, String)],
    ) -> StorageResult<String> {
        let lock = self.locks.for_database(db);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut doc = self.load_existing(db)?;
        let tbl = doc
            .tables
            .get_mut(table)
            .ok_or_else(|| table_not_found(db, table))?;

        let id = tbl.next_id().to_string();
        let mut row = Row::new();
        for (name, value) in fields {
            let stored = if field_is_sensitive(name) {
                seal(value)
            } else {
                value.clone()
            };
            row.insert(name.clone(), stored);
        }
        // The synthetic id always wins over a caller-supplied one
        row.insert(ID_COLUMN.to_string(), id.clone());

        tbl.rows.push(row);
        store_document(&self.config.database_path(db), &doc)?;
        debug!(database = db, table, id = %id, "inserted row");
        Ok(id)
    }

    /// Delete the rows whose ids are in `ids`, returning how many went away
    ///
    /// Ids that match no row are ignored.
    pub fn delete_rows(&self, db: &str, table: &str, ids: &[String]) -> StorageResult<usize> {
        let lock = self.locks.for_database(db);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut doc = self.load_existing(db)?;
        let tbl = doc
            .tables
            .get_mut(table)
            .ok_or_else(|| table_not_found(db, table))?;

        let before = tbl.rows.len();
        tbl.rows
            .retain(|row| row.get(ID_COLUMN).map_or(true, |id| !ids.contains(id)));
        let removed = before - tbl.rows.len();

        if removed > 0 {
            store_document(&self.config.database_path(db), &doc)?;
            debug!(database = db, table, removed, "deleted rows");
        }
        Ok(removed)
    }

    // ==================== Connection record ====================

    /// Read the connection record
    ///
    /// A missing or unreadable record is transparently regenerated; this is
    /// what bootstraps the record on first run.
    pub fn get_connection_info(&self) -> StorageResult<ConnectionInfo> {
        let lock = self.locks.for_database(CONNECTION_FILE);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.config.connection_file_path();
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(info) => return Ok(info),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "connection record unreadable, regenerating");
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::ReadError { path, source: e });
            }
        }

        self.write_connection_record()
    }

    /// Replace the connection record with one carrying a fresh API key
    pub fn regenerate_api_key(&self) -> StorageResult<ConnectionInfo> {
        let lock = self.locks.for_database(CONNECTION_FILE);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        self.write_connection_record()
    }

    /// Write a fresh connection record. Caller holds the record's lock.
    fn write_connection_record(&self) -> StorageResult<ConnectionInfo> {
        let info = ConnectionInfo::generate();
        let path = self.config.connection_file_path();

        let json = serde_json::to_string_pretty(&info).map_err(|e| StorageError::WriteError {
            path: path.clone(),
            source: io::Error::other(e),
        })?;
        persistence::atomic_write(&path, json.as_bytes())?;

        info!("issued new API key");
        Ok(info)
    }

    // ==================== Backups ====================

    /// Snapshot a database into the backup root
    ///
    /// A full backup copies the source file byte for byte. A partial backup
    /// writes a document holding only the tables named in `selected_tables`;
    /// names not present in the source are silently ignored.
    pub fn backup(
        &self,
        db: &str,
        selected_tables: &[String],
        full: bool,
    ) -> StorageResult<BackupReport> {
        let timestamp = Local::now().format("%H%M%S").to_string();
        self.backup_at(db, selected_tables, full, &timestamp)
    }

    fn backup_at(
        &self,
        db: &str,
        selected_tables: &[String],
        full: bool,
        timestamp: &str,
    ) -> StorageResult<BackupReport> {
        let lock = self.locks.for_database(db);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let src = self.config.database_path(db);
        if !src.exists() {
            return Err(StorageError::DatabaseNotFound {
                name: db.to_string(),
            });
        }

        let file_name = backup_file_name(db, full, timestamp);
        let target = self.config.backup_path(&file_name);
        if target.exists() {
            return Err(StorageError::BackupExists { path: target });
        }

        let report = if full {
            fs::copy(&src, &target).map_err(|e| StorageError::from_io(e, target.clone()))?;
            BackupReport::full(db, file_name.clone())
        } else {
            let doc = load_document(&src)?.ok_or_else(|| StorageError::DatabaseNotFound {
                name: db.to_string(),
            })?;

            let mut snapshot = DatabaseDoc::empty();
            for name in selected_tables {
                if let Some(tbl) = doc.tables.get(name) {
                    snapshot.tables.insert(name.clone(), tbl.clone());
                }
            }
            store_document(&target, &snapshot)?;
            BackupReport::partial(db, file_name.clone(), snapshot.tables.keys().cloned().collect())
        };

        info!(database = db, file = %file_name, full, "backup written");
        Ok(report)
    }

    /// File names of all snapshots in the backup root
    pub fn list_backups(&self) -> StorageResult<Vec<String>> {
        let entries =
            fs::read_dir(&self.config.backup_dir).map_err(|e| StorageError::ReadError {
                path: self.config.backup_dir.clone(),
                source: e,
            })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::ReadError {
                path: self.config.backup_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DATABASE_EXT) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }

    // ==================== Internals ====================

    /// Load a database document, failing when it does not exist.
    /// Caller holds the database's lock.
    fn load_existing(&self, db: &str) -> StorageResult<DatabaseDoc> {
        load_document(&self.config.database_path(db))?.ok_or_else(|| {
            StorageError::DatabaseNotFound {
                name: db.to_string(),
            }
        })
    }
}

fn table_not_found(db: &str, table: &str) -> StorageError {
    StorageError::TableNotFound {
        db: db.to_string(),
        table: table.to_string(),
    }
}

/// A database name becomes a file name, so it must be non-empty, free of
/// path separators, and must not collide with the connection record.
fn validate_database_name(name: &str) -> StorageResult<()> {
    let reserved = CONNECTION_FILE.trim_end_matches(".json");
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.starts_with('.')
        || name == reserved
    {
        return Err(StorageError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
