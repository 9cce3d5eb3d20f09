// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// Recollate - MySQL charset and collation migration CLI
///
/// Converts a schema, its tables and its text columns to a new
/// character set and collation while keeping every index intact.
#[derive(Parser, Debug)]
#[command(name = "recollate")]
#[command(author = "Recollate Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Index-preserving charset and collation migration for MySQL")]
#[command(long_about = "Recollate - MySQL charset and collation migration CLI

Converts a MySQL schema to a new character set and collation in place:
indexes are dropped, the schema, columns and tables are converted, and
every index is rebuilt with the (191) prefix rule applied.

Every statement is recorded in <database>-all-queries.sql and the
mutating ones in <database>-required-queries.sql.

Take a backup first: the conversion is not atomic.")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Write .recollate.yaml with databaseName, newCharset, newCollation,
     host, port, username and password
  2. Inspect the index topology:    recollate inspect
  3. Preview the statements:        recollate convert --dry-run
  4. Run the conversion:            recollate convert

For detailed help on each command, use: recollate <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert the schema to the configured charset and collation
    ///
    /// Collects and classifies every index, drops them, converts the
    /// database, columns and tables, rebuilds the indexes and verifies
    /// the index counts with a fresh catalog scan.
    ///
    /// EXAMPLES:
    ///   # Preview the statements without touching the schema
    ///   recollate convert --dry-run
    ///
    ///   # Run the conversion
    ///   recollate convert
    Convert {
        /// Dry run - record statements without executing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the classified index topology of the schema
    ///
    /// Reads the catalog only; nothing is modified.
    ///
    /// EXAMPLES:
    ///   recollate inspect
    ///   recollate inspect --format json
    Inspect,
}
