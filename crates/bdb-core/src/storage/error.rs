//! Storage error handling
//!
//! Typed errors for every engine operation, so callers can tell a missing
//! database from a corrupt one from a filesystem failure.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Requested database file does not exist
    #[error("Database '{name}' does not exist")]
    DatabaseNotFound { name: String },

    /// Requested table is not present in its database
    #[error("Table '{table}' does not exist in database '{db}'")]
    TableNotFound { db: String, table: String },

    /// create_database would overwrite an existing database
    #[error("Database '{name}' already exists")]
    DatabaseExists { name: String },

    /// A backup with the same name was written within the same second
    #[error("Backup file '{path}' already exists; wait a second and retry")]
    BackupExists { path: PathBuf },

    /// Database name is unusable as a file name
    #[error("'{name}' is not a usable database name")]
    InvalidName { name: String },

    /// On-disk document fails to parse as the expected structure
    #[error("Document at '{path}' is corrupted: {details}")]
    Corrupt { path: PathBuf, details: String },

    /// Failed to create a root directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error("Disk full or quota exceeded while writing to '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Whether this error means the requested database or table is missing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::DatabaseNotFound { .. } | StorageError::TableNotFound { .. }
        )
    }
}

/// Check if an I/O error indicates a disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::other("No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
    }

    #[test]
    fn test_write_error_fallback() {
        let io_err = io::Error::other("something else");
        let err = StorageError::from_io(io_err, PathBuf::from("/some/file"));

        assert!(matches!(err, StorageError::WriteError { .. }));
    }

    #[test]
    fn test_is_not_found() {
        let err = StorageError::DatabaseNotFound {
            name: "shop".to_string(),
        };
        assert!(err.is_not_found());

        let err = StorageError::TableNotFound {
            db: "shop".to_string(),
            table: "users".to_string(),
        };
        assert!(err.is_not_found());

        let err = StorageError::DatabaseExists {
            name: "shop".to_string(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_display_names_target() {
        let err = StorageError::TableNotFound {
            db: "shop".to_string(),
            table: "users".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("users"));
        assert!(msg.contains("shop"));
    }
}
