//! Backup producer
//!
//! Snapshots one database into the backup root. A full backup is a
//! byte-for-byte copy of the source file; a partial backup is a fresh
//! document holding only the selected tables. File names carry the kind and
//! the second-of-hour timestamp:
//!
//! - `<db>_FULL_<HHMMSS>.json`
//! - `<db>_PART_<HHMMSS>.json`
//!
//! A second backup of the same database within the same second would land on
//! the same file name; that collision is surfaced as an error instead of
//! silently overwriting the first snapshot.

use serde::Serialize;

/// Outcome of a completed backup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BackupReport {
    /// File name of the snapshot under the backup root
    pub file_name: String,
    /// Tables included in the snapshot; empty for a full copy, which takes
    /// the source file as-is without inspecting it
    pub tables: Vec<String>,
    /// Human-readable summary
    pub message: String,
}

impl BackupReport {
    pub(crate) fn full(db: &str, file_name: String) -> Self {
        let message = format!("Full backup of '{}' written to {}", db, file_name);
        Self {
            file_name,
            tables: Vec::new(),
            message,
        }
    }

    pub(crate) fn partial(db: &str, file_name: String, tables: Vec<String>) -> Self {
        let message = format!(
            "Partial backup of '{}' ({} table(s)) written to {}",
            db,
            tables.len(),
            file_name
        );
        Self {
            file_name,
            tables,
            message,
        }
    }
}

/// Backup file name for a database, kind, and `HHMMSS` timestamp
pub(crate) fn backup_file_name(db: &str, full: bool, timestamp: &str) -> String {
    let kind = if full { "FULL" } else { "PART" };
    format!("{}_{}_{}.json", db, kind, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_file_name() {
        assert_eq!(backup_file_name("shop", true, "120501"), "shop_FULL_120501.json");
        assert_eq!(backup_file_name("shop", false, "120501"), "shop_PART_120501.json");
    }

    #[test]
    fn test_report_messages_name_the_database() {
        let report = BackupReport::full("shop", "shop_FULL_120501.json".to_string());
        assert!(report.message.contains("shop"));
        assert!(report.tables.is_empty());

        let report = BackupReport::partial(
            "shop",
            "shop_PART_120501.json".to_string(),
            vec!["users".to_string()],
        );
        assert!(report.message.contains("1 table(s)"));
        assert_eq!(report.tables, vec!["users"]);
    }
}
