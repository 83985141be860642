//! Row command handlers

use anyhow::{Context, Result};

use bdb_core::Engine;

use crate::output::Output;

/// Parse a `name=value` field argument
pub fn parse_field(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid field '{}': expected name=value", s))
}

/// Show all rows of a table
pub fn list(engine: &Engine, db: String, table: String, output: &Output) -> Result<()> {
    let (columns, rows) = engine
        .get_rows(&db, &table)
        .with_context(|| format!("Failed to read rows of '{}.{}'", db, table))?;
    output.print_rows(&columns, &rows);
    Ok(())
}

/// Insert a row
pub fn insert(
    engine: &Engine,
    db: String,
    table: String,
    fields: Vec<(String, String)>,
    output: &Output,
) -> Result<()> {
    let id = engine
        .insert_row(&db, &table, &fields)
        .with_context(|| format!("Failed to insert into '{}.{}'", db, table))?;

    if output.is_quiet() {
        println!("{}", id);
    } else {
        output.success(&format!("Inserted row {} into '{}.{}'", id, db, table));
    }
    Ok(())
}

/// Delete rows by id
pub fn delete(
    engine: &Engine,
    db: String,
    table: String,
    ids: Vec<String>,
    output: &Output,
) -> Result<()> {
    let removed = engine
        .delete_rows(&db, &table, &ids)
        .with_context(|| format!("Failed to delete rows from '{}.{}'", db, table))?;
    output.success(&format!("Deleted {} row(s) from '{}.{}'", removed, db, table));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("email=a@b.com"),
            Ok(("email".to_string(), "a@b.com".to_string()))
        );
        // Value may contain '='
        assert_eq!(
            parse_field("note=a=b"),
            Ok(("note".to_string(), "a=b".to_string()))
        );
        assert!(parse_field("no-separator").is_err());
    }
}
