//! Validate command implementation

use anyhow::{Context, Result};
use mg_core::ModuleGraph;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common;

/// Execute the validate command
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let graph = ModuleGraph::from_config(&config).context("Failed to build module graph")?;

    println!("Config valid: {} modules", config.modules().len());
    if args.quiet {
        return Ok(());
    }

    println!();
    println!("Apply order:");
    for (i, id) in graph.apply_order().iter().enumerate() {
        let module = config.module(id);
        let name = module.map(|m| m.name.as_str()).unwrap_or_default();
        match graph.lock_reason(id) {
            Some(reason) => println!("  {:>3}. {} - {} [locked: {}]", i + 1, id, name, reason),
            None => println!("  {:>3}. {} - {}", i + 1, id, name),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
