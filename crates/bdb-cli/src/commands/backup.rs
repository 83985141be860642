//! Backup command handlers

use anyhow::{Context, Result};

use bdb_core::Engine;

use crate::output::Output;

/// Write a snapshot of a database
///
/// With no `--table` selection this is a full backup; otherwise only the
/// selected tables are included.
pub fn run(engine: &Engine, db: String, tables: Vec<String>, output: &Output) -> Result<()> {
    let full = tables.is_empty();
    let report = engine
        .backup(&db, &tables, full)
        .with_context(|| format!("Failed to back up '{}'", db))?;

    if output.is_quiet() {
        println!("{}", report.file_name);
    } else {
        output.success(&report.message);
    }
    Ok(())
}

/// List snapshot files in the backup root
pub fn list(engine: &Engine, output: &Output) -> Result<()> {
    let mut names = engine.list_backups().context("Failed to list backups")?;
    names.sort();
    output.print_names(&names, "backup");
    Ok(())
}
