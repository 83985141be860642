//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use bdb_core::ConnectionInfo;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a list of names (databases, tables, backup files)
    pub fn print_names(&self, names: &[String], noun: &str) {
        match self.format {
            OutputFormat::Human => {
                if names.is_empty() {
                    println!("No {}s found.", noun);
                    return;
                }
                for name in names {
                    println!("{}", name);
                }
                println!("\n{} {}(s)", names.len(), noun);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(names).unwrap());
            }
            OutputFormat::Quiet => {
                for name in names {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print a table of rows aligned under its column headers
    pub fn print_rows(&self, columns: &[String], rows: &[Vec<String>]) {
        match self.format {
            OutputFormat::Human => {
                if columns.is_empty() {
                    println!("No columns.");
                    return;
                }

                let widths = column_widths(columns, rows);
                print_grid_line(columns, &widths);
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                print_grid_line(&rule, &widths);
                for row in rows {
                    print_grid_line(row, &widths);
                }
                println!("\n{} row(s)", rows.len());
            }
            OutputFormat::Json => {
                let objects: Vec<_> = rows
                    .iter()
                    .map(|row| {
                        let map: serde_json::Map<String, serde_json::Value> = columns
                            .iter()
                            .zip(row.iter())
                            .map(|(c, v)| (c.clone(), serde_json::Value::String(v.clone())))
                            .collect();
                        serde_json::Value::Object(map)
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&objects).unwrap());
            }
            OutputFormat::Quiet => {
                // First column is always the id
                for row in rows {
                    if let Some(id) = row.first() {
                        println!("{}", id);
                    }
                }
            }
        }
    }

    /// Print the connection record
    pub fn print_connection(&self, info: &ConnectionInfo) {
        match self.format {
            OutputFormat::Human => {
                println!("Host:    {}", info.host);
                println!("Port:    {}", info.port);
                println!("API key: {}", info.api_key);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(info).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", info.api_key);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Width of each column: the widest of header and cell values
fn column_widths(columns: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if i < widths.len() && value.len() > widths[i] {
                widths[i] = value.len();
            }
        }
    }
    widths
}

fn print_grid_line(cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    println!("{}", line.join("  "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_column_widths() {
        let columns = vec!["id".to_string(), "email".to_string()];
        let rows = vec![vec!["1".to_string(), "someone@example.com".to_string()]];

        assert_eq!(column_widths(&columns, &rows), vec![2, 19]);
    }

    #[test]
    fn test_column_widths_ignores_extra_cells() {
        let columns = vec!["id".to_string()];
        let rows = vec![vec!["1".to_string(), "stray".to_string()]];

        assert_eq!(column_widths(&columns, &rows), vec![2]);
    }
}
