//! Database command handlers

use anyhow::{Context, Result};

use bdb_core::Engine;

use crate::output::Output;

/// List all databases
pub fn list(engine: &Engine, output: &Output) -> Result<()> {
    let mut names = engine
        .list_databases()
        .context("Failed to list databases")?;
    // Directory order is platform-dependent; sort for stable display
    names.sort();
    output.print_names(&names, "database");
    Ok(())
}

/// Create a new empty database
pub fn create(engine: &Engine, name: String, output: &Output) -> Result<()> {
    engine
        .create_database(&name)
        .with_context(|| format!("Failed to create database '{}'", name))?;
    output.success(&format!("Created database '{}'", name));
    Ok(())
}

/// Delete a database
pub fn delete(engine: &Engine, name: String, output: &Output) -> Result<()> {
    engine
        .delete_database(&name)
        .with_context(|| format!("Failed to delete database '{}'", name))?;
    output.success(&format!("Deleted database '{}'", name));
    Ok(())
}
