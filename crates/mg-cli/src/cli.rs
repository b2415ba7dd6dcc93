//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Modgraph - lint, order, and package SurrealDB migration modules
#[derive(Parser, Debug)]
#[command(name = "mg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the migrations root
    #[arg(short, long, global = true, env = "MG_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Override config file path (relative paths resolve against the root)
    #[arg(short, long, global = true, env = "MG_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate the module config
    Validate(ValidateArgs),

    /// Lint migration files, module layout, and config
    Lint(LintArgs),

    /// Print the module execution order
    Order(OrderArgs),

    /// List discovered modules
    Ls(LsArgs),

    /// Package a module as a .tar.gz archive
    Export(ExportArgs),

    /// Install a packaged module under the migrations root
    Import(ImportArgs),

    /// Create a config.json from the module directories on disk
    Init(InitArgs),

    /// Create a new up/down migration pair in a module
    New(NewArgs),
}

/// Arguments for the validate command
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Skip printing the apply order on success
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: LintFormat,
}

/// Lint output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintFormat {
    /// One line per finding plus a summary
    Text,
    /// Full report as JSON
    Json,
}

/// Arguments for the order command
#[derive(Args, Debug, Default)]
pub struct OrderArgs {
    /// Print rollback order instead of apply order
    #[arg(long)]
    pub rollback: bool,

    /// Limit the plan to these modules and their closure (comma-separated)
    #[arg(short, long)]
    pub modules: Option<String>,

    /// Include locked modules in a rollback plan
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: LsFormat,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsFormat {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Module id, numeric prefix, or name (e.g. 010_auth, 10, auth)
    pub selector: String,

    /// Directory to write the archive to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Target module id (e.g. 010_auth)
    pub module: String,

    /// Package path: a module directory, .tar.gz or .tgz
    pub package: PathBuf,

    /// Replace an existing module directory
    #[arg(long)]
    pub overwrite: bool,

    /// Do not add the module's metadata to the config
    #[arg(long)]
    pub no_merge_config: bool,
}

/// Arguments for the init command
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Replace an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the new command
#[derive(Args, Debug, Default)]
pub struct NewArgs {
    /// Module id, numeric prefix, or name (e.g. 010_auth, 10, auth)
    pub module: String,

    /// Migration label, e.g. add_user_index
    pub name: String,

    /// Create the module directory if it does not exist (requires a full module id)
    #[arg(long)]
    pub create_module: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
