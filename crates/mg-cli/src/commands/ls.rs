//! List command implementation

use anyhow::{Context, Result};
use mg_core::{discover_modules, Config};
use serde::Serialize;

use crate::cli::{GlobalArgs, LsArgs, LsFormat};
use crate::commands::common;

/// Module information for display
#[derive(Debug, Serialize)]
struct ModuleInfo {
    id: String,
    name: Option<String>,
    status: ModuleStatus,
    files: usize,
    pairs: usize,
    dependencies: Vec<String>,
    locked: bool,
}

/// How a module relates to the config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ModuleStatus {
    /// On disk and declared
    Declared,
    /// On disk, not declared
    Undeclared,
    /// Declared, no directory
    Missing,
    /// No usable config to compare against
    Unknown,
}

impl std::fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleStatus::Declared => write!(f, "declared"),
            ModuleStatus::Undeclared => write!(f, "undeclared"),
            ModuleStatus::Missing => write!(f, "missing"),
            ModuleStatus::Unknown => write!(f, "-"),
        }
    }
}

/// Execute the ls command
pub(crate) async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let modules = collect_modules(global)?;
    match args.format {
        LsFormat::Table => print_table(&modules),
        LsFormat::Json => {
            let json =
                serde_json::to_string_pretty(&modules).context("Failed to serialize to JSON")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn collect_modules(global: &GlobalArgs) -> Result<Vec<ModuleInfo>> {
    let root = common::root(global);
    let discovery = discover_modules(root).context("Failed to discover modules")?;
    let config = match Config::load_optional(root, common::config_override(global)) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring config: {e}");
            None
        }
    };

    let mut modules: Vec<ModuleInfo> = discovery
        .modules
        .iter()
        .map(|module| {
            let declared = config.as_ref().and_then(|c| c.module(&module.id));
            let status = match (&config, declared) {
                (None, _) => ModuleStatus::Unknown,
                (Some(_), Some(_)) => ModuleStatus::Declared,
                (Some(_), None) => ModuleStatus::Undeclared,
            };
            ModuleInfo {
                id: module.id.to_string(),
                name: declared.map(|m| m.name.clone()),
                status,
                files: module.files.len(),
                pairs: module.pair_count(),
                dependencies: declared
                    .map(|m| m.dependencies.iter().map(|d| d.to_string()).collect())
                    .unwrap_or_default(),
                locked: declared.is_some_and(|m| m.locked),
            }
        })
        .collect();

    if let Some(config) = &config {
        for (id, module) in config.modules().iter() {
            if discovery.module(id).is_some() {
                continue;
            }
            modules.push(ModuleInfo {
                id: id.to_string(),
                name: Some(module.name.clone()),
                status: ModuleStatus::Missing,
                files: 0,
                pairs: 0,
                dependencies: module.dependencies.iter().map(|d| d.to_string()).collect(),
                locked: module.locked,
            });
        }
    }

    modules.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(modules)
}

/// Print modules in table format
fn print_table(modules: &[ModuleInfo]) {
    let id_width = modules.iter().map(|m| m.id.len()).max().unwrap_or(6).max(6);
    let name_width = modules
        .iter()
        .map(|m| m.name.as_ref().map(|s| s.len()).unwrap_or(1))
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        "{:<id_width$}  {:<name_width$}  {:<10}  {:>5}  {:>5}  DEPENDS_ON",
        "MODULE", "NAME", "STATUS", "FILES", "PAIRS"
    );
    println!(
        "{:-<id_width$}  {:-<name_width$}  {:-<10}  {:->5}  {:->5}  {}",
        "",
        "",
        "",
        "",
        "",
        "-".repeat(30)
    );

    for module in modules {
        let deps = if module.dependencies.is_empty() {
            "-".to_string()
        } else {
            module.dependencies.join(", ")
        };
        let id = if module.locked {
            format!("{}*", module.id)
        } else {
            module.id.clone()
        };
        println!(
            "{:<id_width$}  {:<name_width$}  {:<10}  {:>5}  {:>5}  {}",
            id,
            module.name.as_deref().unwrap_or("-"),
            module.status.to_string(),
            module.files,
            module.pairs,
            deps
        );
    }

    println!();
    println!("{} modules found (* = locked)", modules.len());
}

#[cfg(test)]
#[path = "ls_test.rs"]
mod tests;
