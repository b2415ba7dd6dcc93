//! Filesystem discovery of module directories and their migration files.
//!
//! Discovery is independent of the declarative config: it reports what is on
//! disk so the lint engine can detect drift. It only reads.

use crate::error::{CoreError, CoreResult};
use crate::migration::{MigrationFile, SCRIPT_EXTENSION};
use crate::module_id::ModuleId;
use std::path::{Path, PathBuf};

/// A module directory found under the migrations root.
#[derive(Debug, Clone)]
pub struct DiscoveredModule {
    pub id: ModuleId,
    pub path: PathBuf,
    /// Well-formed migration files, sorted by file name
    pub files: Vec<MigrationFile>,
    /// Names ending in `_up.surql`/`_down.surql` that do not parse
    pub malformed: Vec<String>,
    /// Set when the directory could not be listed; `files` is then empty
    pub read_error: Option<String>,
}

impl DiscoveredModule {
    /// Number of sequences with both an up and a down file.
    pub fn pair_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.direction == crate::migration::Direction::Up)
            .filter(|up| {
                let down = up.counterpart_name();
                self.files.iter().any(|f| f.file_name() == down)
            })
            .count()
    }
}

/// A subdirectory that does not follow the module naming convention.
#[derive(Debug, Clone)]
pub struct RejectedDir {
    pub name: String,
    pub path: PathBuf,
}

/// Result of scanning a migrations root.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Valid module directories, sorted by id
    pub modules: Vec<DiscoveredModule>,
    /// Directories with invalid names, sorted by name
    pub rejected_dirs: Vec<RejectedDir>,
}

impl Discovery {
    pub fn module(&self, id: &str) -> Option<&DiscoveredModule> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id.clone()).collect()
    }
}

/// Scan `root` for module directories and migration files.
///
/// Hidden directories (leading `.`) are skipped. A module directory that
/// cannot be listed is still reported, with [`DiscoveredModule::read_error`] set.
pub fn discover_modules(root: &Path) -> CoreResult<Discovery> {
    if !root.is_dir() {
        return Err(CoreError::RootNotFound {
            path: root.display().to_string(),
        });
    }

    let mut discovery = Discovery::default();

    for (name, path) in sorted_entries(root, |p| p.is_dir())? {
        if name.starts_with('.') {
            continue;
        }
        match ModuleId::try_new(name.as_str()) {
            Some(id) => {
                let module = match discover_module(id.clone(), &path) {
                    Ok(module) => module,
                    Err(e) => {
                        log::warn!("Cannot list module {}: {}", id, e);
                        DiscoveredModule {
                            id,
                            path,
                            files: Vec::new(),
                            malformed: Vec::new(),
                            read_error: Some(e.to_string()),
                        }
                    }
                };
                log::debug!(
                    "Discovered module {} ({} files)",
                    module.id,
                    module.files.len()
                );
                discovery.modules.push(module);
            }
            None => discovery.rejected_dirs.push(RejectedDir { name, path }),
        }
    }

    Ok(discovery)
}

fn discover_module(id: ModuleId, dir: &Path) -> CoreResult<DiscoveredModule> {
    let mut files = Vec::new();
    let mut malformed = Vec::new();

    for (name, path) in sorted_entries(dir, |p| p.is_file())? {
        if !MigrationFile::has_direction_suffix(&name) {
            continue;
        }
        match MigrationFile::parse_name(&name) {
            Some((sequence, label, direction)) => files.push(MigrationFile {
                module_id: id.clone(),
                sequence,
                label,
                direction,
                path,
            }),
            None => malformed.push(name),
        }
    }

    Ok(DiscoveredModule {
        id,
        path: dir.to_path_buf(),
        files,
        malformed,
        read_error: None,
    })
}

/// List every `.surql` regular file directly inside `dir`, sorted by name.
pub fn list_script_files(dir: &Path) -> CoreResult<Vec<(String, PathBuf)>> {
    Ok(sorted_entries(dir, |p| p.is_file())?
        .into_iter()
        .filter(|(_, path)| path.extension().is_some_and(|e| e == SCRIPT_EXTENSION))
        .collect())
}

/// Directory entries accepted by `keep`, as `(file name, path)` sorted by name.
fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> CoreResult<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::io("read directory", dir, e))? {
        let entry = entry.map_err(|e| CoreError::io("read directory", dir, e))?;
        let path = entry.path();
        if !keep(&path) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, path));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
