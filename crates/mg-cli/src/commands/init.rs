//! Init command implementation - scaffolds config.json from module directories

use anyhow::{Context, Result};
use mg_core::{discover_modules, Config, CONFIG_FILE_NAMES};
use std::path::PathBuf;

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common;

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let root = common::root(global);
    let target = config_target(global);

    let existing = match common::config_override(global) {
        Some(_) => target.is_file().then(|| target.clone()),
        None => Config::find(root),
    };
    if let Some(existing) = existing {
        if !args.force {
            anyhow::bail!(
                "Config '{}' already exists. Use --force to replace it.",
                existing.display()
            );
        }
    }

    let discovery = discover_modules(root).context("Failed to discover modules")?;
    for dir in &discovery.rejected_dirs {
        log::warn!("Skipping directory '{}': not a module id", dir.name);
    }

    let config = Config::scaffold(&discovery.module_ids());
    config
        .write_atomic(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!(
        "Created {} with {} modules",
        target.display(),
        config.modules().len()
    );
    for id in config.modules().ids() {
        println!("  {}", id);
    }
    Ok(())
}

/// Where the scaffolded config is written.
fn config_target(global: &GlobalArgs) -> PathBuf {
    let root = common::root(global);
    match common::config_override(global) {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => root.join(path),
        None => root.join(CONFIG_FILE_NAMES[0]),
    }
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
