//! bdb core library
//!
//! A flat-file, JSON-backed record store: one document per database, ad-hoc
//! string schemas, auto-incrementing string ids, sealed password-like
//! fields, and timestamped snapshot backups.
//!
//! # Quick Start
//!
//! ```text
//! let engine = Engine::open(Config::load()?)?;
//!
//! engine.create_database("shop")?;
//! engine.create_table("shop", "customers", &["email".to_string()])?;
//! engine.insert_row("shop", "customers", &fields)?;
//!
//! let (columns, rows) = engine.get_rows("shop", "customers")?;
//! ```
//!
//! # Modules
//!
//! - `engine`: the storage engine (main entry point)
//! - `models`: persisted document types
//! - `storage`: document persistence, repair, errors, locking
//! - `backup`: snapshot production
//! - `seal`: one-way transform for password-like fields
//! - `config`: engine configuration

pub mod backup;
pub mod config;
pub mod engine;
pub mod models;
pub mod seal;
pub mod storage;

pub use backup::BackupReport;
pub use config::Config;
pub use engine::Engine;
pub use models::{ConnectionInfo, DatabaseDoc, Row, Table};
pub use storage::{StorageError, StorageResult};
