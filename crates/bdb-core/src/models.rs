//! Persisted document types
//!
//! These structs mirror the on-disk JSON contract exactly:
//! - a database file is `{"tables": {<name>: {"columns": [..], "rows": [..]}}}`
//! - the connection record is `{"host": .., "port": .., "api_key": ..}`
//!
//! Table names map to [`Table`] values; a missing `tables` key makes a file
//! fail to parse as a database document, which is how the repair pass and the
//! read paths tell databases apart from everything else.

use std::collections::BTreeMap;

use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// The synthetic primary-key column present in every table.
pub const ID_COLUMN: &str = "id";

/// Prefix carried by every generated API key.
pub const API_KEY_PREFIX: &str = "bdb_";

/// Random characters in a generated API key, after the prefix.
const API_KEY_LEN: usize = 32;

/// A single row: column name to stored string value.
///
/// A row need not contain every declared column, and may carry keys beyond
/// the declared columns; the column-aware reader projects only declared ones.
pub type Row = BTreeMap<String, String>;

/// A database document, one per file under the data root.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatabaseDoc {
    /// Table name to table, unique within the database.
    pub tables: BTreeMap<String, Table>,
}

impl DatabaseDoc {
    /// A freshly created database holds no tables.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A table: ordered columns plus an append-only row list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Table {
    /// Column names; `columns[0]` is always `"id"`.
    pub columns: Vec<String>,
    /// Rows in insertion order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table with the synthetic `id` column followed by the
    /// caller-declared columns.
    pub fn new(extra_columns: &[String]) -> Self {
        let mut columns = Vec::with_capacity(extra_columns.len() + 1);
        columns.push(ID_COLUMN.to_string());
        columns.extend(extra_columns.iter().cloned());
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Identifier for the next inserted row.
    ///
    /// One past the largest purely-numeric id, or 1 when the table is empty
    /// or holds no numeric ids. Ids are never reused after a deletion.
    pub fn next_id(&self) -> u64 {
        self.rows
            .iter()
            .filter_map(|row| row.get(ID_COLUMN))
            .filter_map(|value| value.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1)
    }
}

/// The singleton connection record stored alongside the databases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: String,
    pub api_key: String,
}

impl ConnectionInfo {
    /// Produce a fresh record with a newly generated API key.
    ///
    /// Keys are not checked against previously issued ones; a collision over
    /// 32 alphanumeric characters is negligible.
    pub fn generate() -> Self {
        let key: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(API_KEY_LEN)
            .map(char::from)
            .collect();
        Self {
            host: "127.0.0.1".to_string(),
            port: "5000".to_string(),
            api_key: format!("{}{}", API_KEY_PREFIX, key),
        }
    }
}
