//! Migration generator: writes a new up/down pair at a module's next sequence.

use crate::discovery::list_script_files;
use crate::error::{CoreError, CoreResult};
use crate::migration::{Direction, MigrationFile};
use crate::module_id::ModuleId;
use crate::selector::ModuleSelector;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_SEQUENCE: u32 = 9999;

/// A freshly written migration pair.
#[derive(Debug, Clone)]
pub struct NewMigration {
    pub module_id: ModuleId,
    /// Four-digit sequence, e.g. `"0003"`
    pub sequence: String,
    pub label: String,
    pub up: PathBuf,
    pub down: PathBuf,
    /// Whether the module directory was created for this migration
    pub module_created: bool,
}

/// Create `{seq}_{label}_up.surql` and `{seq}_{label}_down.surql` in the
/// module named by `module`.
///
/// The sequence is one past the highest existing sequence in the module.
/// With `create_module`, a `module` that matches no directory must be a full
/// module id and its directory is created. Existing files are never
/// overwritten.
pub fn create_migration(
    root: &Path,
    module: &str,
    name: &str,
    create_module: bool,
) -> CoreResult<NewMigration> {
    let label = normalize_label(name)?;
    let candidates = crate::discovery::discover_modules(root)?.module_ids();

    let (module_id, module_created) = match ModuleSelector::parse(module)?.select(module, &candidates) {
        Ok(id) => (id.clone(), false),
        Err(CoreError::ModuleNotFound { .. }) if create_module => {
            let id = ModuleId::parse(module.trim())?;
            let dir = root.join(id.as_str());
            std::fs::create_dir(&dir).map_err(|e| CoreError::io("create directory", &dir, e))?;
            log::info!("Created module directory {}", dir.display());
            (id, true)
        }
        Err(e) => return Err(e),
    };

    let dir = root.join(module_id.as_str());
    let sequence = next_sequence(&dir, name)?;
    let up = dir.join(format!("{sequence}_{label}{}", Direction::Up.suffix()));
    let down = dir.join(format!("{sequence}_{label}{}", Direction::Down.suffix()));

    write_new(&up, &template(&module_id, &label, Direction::Up))?;
    if let Err(e) = write_new(&down, &template(&module_id, &label, Direction::Down)) {
        // never leave an unpaired up file behind
        if let Err(cleanup) = std::fs::remove_file(&up) {
            log::warn!("Failed to remove {}: {cleanup}", up.display());
        }
        return Err(e);
    }

    log::info!("Created migration {sequence}_{label} in {module_id}");
    Ok(NewMigration {
        module_id,
        sequence,
        label,
        up,
        down,
        module_created,
    })
}

/// `Add user index` -> `add_user_index`
fn normalize_label(name: &str) -> CoreResult<String> {
    let label = name
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_lowercase();
    let sample = format!("0001_{label}{}", Direction::Up.suffix());
    match MigrationFile::parse_name(&sample) {
        Some((_, parsed, _)) if parsed == label => Ok(label),
        _ => Err(CoreError::InvalidMigrationName {
            name: name.to_string(),
            reason: "use lowercase letters, digits, '_' and '-', starting with a letter or digit"
                .to_string(),
        }),
    }
}

fn next_sequence(dir: &Path, name: &str) -> CoreResult<String> {
    let highest = list_script_files(dir)?
        .iter()
        .filter_map(|(file, _)| MigrationFile::parse_name(file))
        .filter_map(|(sequence, _, _)| sequence.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    if highest >= MAX_SEQUENCE {
        return Err(CoreError::InvalidMigrationName {
            name: name.to_string(),
            reason: format!("module {} has no sequence numbers left", dir.display()),
        });
    }
    Ok(format!("{:04}", highest + 1))
}

fn template(module_id: &ModuleId, label: &str, direction: Direction) -> String {
    format!("-- Migration: {label} ({direction})\n-- Module: {module_id}\n\n")
}

fn write_new(path: &Path, content: &str) -> CoreResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| CoreError::io("create", path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| CoreError::io("write", path, e))
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
