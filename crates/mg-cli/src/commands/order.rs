//! Order command implementation - prints the apply or rollback plan

use anyhow::{Context, Result};
use mg_core::{ModuleGraph, ModuleId};

use crate::cli::{GlobalArgs, OrderArgs};
use crate::commands::common;

/// Execute the order command
pub(crate) async fn execute(args: &OrderArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let graph = ModuleGraph::from_config(&config).context("Failed to build module graph")?;

    let plan = build_plan(&graph, args)?;
    let label = if args.rollback { "Rollback" } else { "Apply" };
    println!("{} order ({} modules):", label, plan.len());
    for (i, id) in plan.iter().enumerate() {
        match graph.lock_reason(id) {
            Some(reason) => println!("  {:>3}. {} [locked: {}]", i + 1, id, reason),
            None => println!("  {:>3}. {}", i + 1, id),
        }
    }
    Ok(())
}

/// Plan for the requested targets, or for every module when none are given.
fn build_plan(graph: &ModuleGraph, args: &OrderArgs) -> Result<Vec<ModuleId>> {
    let targets = match &args.modules {
        Some(raw) => common::split_list(raw)
            .into_iter()
            .map(ModuleId::parse)
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --modules value")?,
        None => graph.apply_order(),
    };

    let plan = if args.rollback {
        graph.rollback_plan(&targets, args.force)?
    } else {
        graph.apply_plan(&targets)?
    };
    log::debug!("Planned {} of {} modules", plan.len(), graph.len());
    Ok(plan)
}

#[cfg(test)]
#[path = "order_test.rs"]
mod tests;
