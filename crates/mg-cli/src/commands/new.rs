//! New command implementation - writes an up/down migration pair

use anyhow::{Context, Result};
use mg_core::{create_migration, Config};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common;

/// Execute the new command
pub(crate) async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let root = common::root(global).to_path_buf();
    let module = args.module.clone();
    let name = args.name.clone();
    let create_module = args.create_module;

    let created =
        tokio::task::spawn_blocking(move || create_migration(&root, &module, &name, create_module))
            .await
            .context("Migration task panicked")?
            .with_context(|| format!("Failed to create migration in '{}'", args.module))?;

    if created.module_created {
        println!("Created module directory {}", created.module_id);
        let config_path =
            Config::resolve_path(common::root(global), common::config_override(global));
        if let Ok(path) = config_path {
            let declared = Config::load_file(&path)
                .map(|config| config.modules().contains(&created.module_id))
                .unwrap_or(false);
            if !declared {
                eprintln!(
                    "warning: {} is not declared in {}",
                    created.module_id,
                    path.display()
                );
            }
        }
    }
    println!("Created migration {}_{}", created.sequence, created.label);
    println!("  {}", created.up.display());
    println!("  {}", created.down.display());
    Ok(())
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
