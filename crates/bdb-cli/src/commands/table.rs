//! Table command handlers

use anyhow::{Context, Result};

use bdb_core::Engine;

use crate::output::Output;

/// List tables in a database
pub fn list(engine: &Engine, db: String, output: &Output) -> Result<()> {
    let names = engine
        .list_tables(&db)
        .with_context(|| format!("Failed to list tables of '{}'", db))?;
    output.print_names(&names, "table");
    Ok(())
}

/// Create a table
pub fn create(
    engine: &Engine,
    db: String,
    name: String,
    columns: Vec<String>,
    output: &Output,
) -> Result<()> {
    engine
        .create_table(&db, &name, &columns)
        .with_context(|| format!("Failed to create table '{}' in '{}'", name, db))?;
    output.success(&format!("Created table '{}' in '{}'", name, db));
    Ok(())
}

/// Delete a table
pub fn delete(engine: &Engine, db: String, name: String, output: &Output) -> Result<()> {
    engine
        .delete_table(&db, &name)
        .with_context(|| format!("Failed to delete table '{}' from '{}'", name, db))?;
    output.success(&format!("Deleted table '{}' from '{}'", name, db));
    Ok(())
}
