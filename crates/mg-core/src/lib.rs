//! mg-core - Core library for Modgraph
//!
//! This crate provides the migration module config loader and validator,
//! filesystem discovery, the lint engine, module packaging, the migration
//! generator, and dependency ordering used by the `mg` CLI.

pub mod config;
pub mod discovery;
pub mod error;
pub mod generate;
pub mod graph;
pub mod lint;
pub mod migration;
pub mod module_id;
pub mod package;
pub mod selector;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use config::{Config, ConfigFormat, ModuleConfig, ModuleMap, Settings, CONFIG_FILE_NAMES};
pub use discovery::{discover_modules, DiscoveredModule, Discovery, RejectedDir};
pub use error::{CoreError, CoreResult};
pub use generate::{create_migration, NewMigration};
pub use graph::ModuleGraph;
pub use lint::{lint, Finding, LintReport, Rule, Severity};
pub use migration::{Direction, MigrationFile, SCRIPT_EXTENSION};
pub use module_id::ModuleId;
pub use package::{
    export_module, import_module, ExportOptions, ExportedModule, ImportOptions, ImportedModule,
};
pub use selector::{resolve_module_selector, ModuleSelector};
pub use validation::{detect_cycles, Violation, ViolationKind};
