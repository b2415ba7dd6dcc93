//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use mg_core::{Config, CoreError};
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: the command has already printed what went wrong.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit status for a circular module dependency.
pub(crate) const EXIT_CIRCULAR_DEPENDENCY: i32 = 3;

pub(crate) fn root(global: &GlobalArgs) -> &Path {
    &global.root
}

pub(crate) fn config_override(global: &GlobalArgs) -> Option<&Path> {
    global.config.as_deref()
}

/// Load the validated config, printing every violation on failure.
///
/// A circular dependency maps to exit code 3, other config problems to 1.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match Config::load(root(global), config_override(global)) {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigValidation { path, violations }) => {
            eprintln!("Invalid config {}:", path);
            for violation in &violations {
                eprintln!("  - {}", violation);
            }
            let circular = violations
                .iter()
                .any(|v| v.kind == mg_core::ViolationKind::CircularDependency);
            let code = if circular { EXIT_CIRCULAR_DEPENDENCY } else { 1 };
            Err(ExitCode(code).into())
        }
        Err(e) => Err(e).context("Failed to load config"),
    }
}

/// Split a comma-separated module list, dropping empty items.
pub(crate) fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
