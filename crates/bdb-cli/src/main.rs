//! bdb CLI
//!
//! Command-line interface for bdb - a flat-file JSON database manager.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bdb_core::{Config, Engine};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "bdb")]
#[command(about = "bdb - flat-file JSON database manager")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage databases
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage tables within a database
    Table {
        #[command(subcommand)]
        command: TableCommands,
    },
    /// Browse and edit rows
    Row {
        #[command(subcommand)]
        command: RowCommands,
    },
    /// Show or rotate the connection credentials
    Connection {
        #[command(subcommand)]
        command: Option<ConnectionCommands>,
    },
    /// Snapshot databases into the backup root
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// List all databases
    #[command(alias = "ls")]
    List,
    /// Create a new empty database
    Create {
        /// Database name
        name: String,
    },
    /// Delete a database and all its tables
    #[command(alias = "rm")]
    Delete {
        /// Database name
        name: String,
    },
}

#[derive(Subcommand)]
enum TableCommands {
    /// List tables in a database
    #[command(alias = "ls")]
    List {
        /// Database name
        db: String,
    },
    /// Create a table; an id column is always added first
    Create {
        /// Database name
        db: String,
        /// Table name
        name: String,
        /// Additional column (repeatable)
        #[arg(short, long)]
        column: Vec<String>,
    },
    /// Delete a table
    #[command(alias = "rm")]
    Delete {
        /// Database name
        db: String,
        /// Table name
        name: String,
    },
}

#[derive(Subcommand)]
enum RowCommands {
    /// Show all rows of a table
    #[command(alias = "ls")]
    List {
        /// Database name
        db: String,
        /// Table name
        table: String,
    },
    /// Insert a row; fields whose name contains "pass" are stored sealed
    Insert {
        /// Database name
        db: String,
        /// Table name
        table: String,
        /// Field as name=value (repeatable)
        #[arg(short, long, value_parser = commands::row::parse_field)]
        field: Vec<(String, String)>,
    },
    /// Delete rows by id
    #[command(alias = "rm")]
    Delete {
        /// Database name
        db: String,
        /// Table name
        table: String,
        /// Row ids to delete
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Clone)]
enum ConnectionCommands {
    /// Show host, port, and API key
    Show,
    /// Issue a new API key, replacing the old one
    Regenerate,
}

#[derive(Subcommand)]
enum BackupCommands {
    /// Write a snapshot of a database
    Run {
        /// Database name
        db: String,
        /// Back up only this table (repeatable); omit for a full backup
        #[arg(short, long)]
        table: Vec<String>,
    },
    /// List snapshot files in the backup root
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backup_dir)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the engine
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let config = Config::load().context("Failed to load configuration")?;
    let engine = Engine::open(config).context("Failed to open storage engine")?;

    match cli.command {
        Commands::Db { command } => handle_db_command(command, &engine, &output),
        Commands::Table { command } => handle_table_command(command, &engine, &output),
        Commands::Row { command } => handle_row_command(command, &engine, &output),
        Commands::Connection { command } => handle_connection_command(command, &engine, &output),
        Commands::Backup { command } => handle_backup_command(command, &engine, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_db_command(command: DbCommands, engine: &Engine, output: &Output) -> Result<()> {
    match command {
        DbCommands::List => commands::db::list(engine, output),
        DbCommands::Create { name } => commands::db::create(engine, name, output),
        DbCommands::Delete { name } => commands::db::delete(engine, name, output),
    }
}

fn handle_table_command(command: TableCommands, engine: &Engine, output: &Output) -> Result<()> {
    match command {
        TableCommands::List { db } => commands::table::list(engine, db, output),
        TableCommands::Create { db, name, column } => {
            commands::table::create(engine, db, name, column, output)
        }
        TableCommands::Delete { db, name } => commands::table::delete(engine, db, name, output),
    }
}

fn handle_row_command(command: RowCommands, engine: &Engine, output: &Output) -> Result<()> {
    match command {
        RowCommands::List { db, table } => commands::row::list(engine, db, table, output),
        RowCommands::Insert { db, table, field } => {
            commands::row::insert(engine, db, table, field, output)
        }
        RowCommands::Delete { db, table, ids } => {
            commands::row::delete(engine, db, table, ids, output)
        }
    }
}

fn handle_connection_command(
    command: Option<ConnectionCommands>,
    engine: &Engine,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConnectionCommands::Show) | None => commands::connection::show(engine, output),
        Some(ConnectionCommands::Regenerate) => commands::connection::regenerate(engine, output),
    }
}

fn handle_backup_command(command: BackupCommands, engine: &Engine, output: &Output) -> Result<()> {
    match command {
        BackupCommands::Run { db, table } => commands::backup::run(engine, db, table, output),
        BackupCommands::List => commands::backup::list(engine, output),
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}
