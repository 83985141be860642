//! Connection command handlers

use anyhow::{Context, Result};

use bdb_core::Engine;

use crate::output::Output;

/// Show the connection record
pub fn show(engine: &Engine, output: &Output) -> Result<()> {
    let info = engine
        .get_connection_info()
        .context("Failed to read connection record")?;
    output.print_connection(&info);
    Ok(())
}

/// Issue a new API key
pub fn regenerate(engine: &Engine, output: &Output) -> Result<()> {
    let info = engine
        .regenerate_api_key()
        .context("Failed to regenerate API key")?;

    output.success("Issued a new API key");
    output.print_connection(&info);
    Ok(())
}
