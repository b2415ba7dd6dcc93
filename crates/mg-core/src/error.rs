//! Error types for mg-core

use crate::validation::Violation;
use thiserror::Error;

/// Core error type for Modgraph
#[derive(Error, Debug)]
pub enum CoreError {
    /// MG001: Configuration file not found
    #[error("[MG001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// MG002: Configuration file could not be parsed
    #[error("[MG002] Failed to parse config '{path}': {message}")]
    ConfigParse { path: String, message: String },

    /// MG003: Configuration parsed but violates structural rules
    #[error("[MG003] Invalid config '{path}': {}", format_violations(violations))]
    ConfigValidation {
        path: String,
        violations: Vec<Violation>,
    },

    /// MG004: Migrations root directory not found
    #[error("[MG004] Migrations root not found: {path}")]
    RootNotFound { path: String },

    /// MG005: No module directory matches a selector
    #[error("[MG005] Module not found: {selector}")]
    ModuleNotFound { selector: String },

    /// MG006: Selector matches more than one module directory
    #[error("[MG006] Selector '{selector}' is ambiguous, matches: {}", candidates.join(", "))]
    AmbiguousSelector {
        selector: String,
        candidates: Vec<String>,
    },

    /// MG007: Import target already exists
    #[error("[MG007] Module '{module}' already exists at {path}. Use overwrite to replace it.")]
    ModuleAlreadyExists { module: String, path: String },

    /// MG008: Package path is neither a directory nor a gzip tarball
    #[error("[MG008] Unsupported package format: {path} (expected a directory, .tar.gz or .tgz)")]
    UnsupportedFormat { path: String },

    /// MG009: Package path does not exist
    #[error("[MG009] Package not found: {path}")]
    PackageNotFound { path: String },

    /// MG010: Circular dependency detected
    #[error("[MG010] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// MG011: Destructive operation on a locked module
    #[error("[MG011] Module '{module}' is locked: {reason}")]
    ModuleLocked { module: String, reason: String },

    /// MG012: String is not a valid module id
    #[error("[MG012] Invalid module id '{id}': must match NNN_name (e.g. 010_auth)")]
    InvalidModuleId { id: String },

    /// MG014: A new migration cannot be created with this name
    #[error("[MG014] Cannot create migration '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// MG013: IO error with file path context
    #[error("[MG013] Failed to {action} '{path}': {source}")]
    IoWithPath {
        action: &'static str,
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Wrap an IO error with the attempted action and path.
    pub(crate) fn io(action: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            action,
            path: path.display().to_string(),
            source,
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
