//! Export command implementation

use anyhow::{Context, Result};
use mg_core::{export_module, ExportOptions};

use crate::cli::{ExportArgs, GlobalArgs};
use crate::commands::common;

/// Execute the export command
pub(crate) async fn execute(args: &ExportArgs, global: &GlobalArgs) -> Result<()> {
    let root = common::root(global).to_path_buf();
    let selector = args.selector.clone();
    let options = ExportOptions {
        output_dir: args.output_dir.clone(),
        config_path: global.config.clone(),
    };

    let exported = tokio::task::spawn_blocking(move || export_module(&root, &selector, &options))
        .await
        .context("Export task panicked")?
        .with_context(|| format!("Failed to export module '{}'", args.selector))?;

    for warning in &exported.warnings {
        eprintln!("warning: {}", warning);
    }
    println!(
        "Exported {} ({} files) to {}",
        exported.module_id,
        exported.files.len(),
        exported.archive_path.display()
    );
    if global.verbose {
        for file in &exported.files {
            println!("  {}", file);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
