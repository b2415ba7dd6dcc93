//! Export and import of single modules as gzip tarballs.
//!
//! An exported archive holds the module's `.surql` files as bare entry names.
//! Declared module metadata travels in the gzip header comment so the tar
//! entries stay script-only and any `tar xzf` reproduces the module directory
//! contents exactly.
//!
//! Neither operation locks anything. Callers must not run an import and an
//! export (or two imports) against the same module id concurrently.

use crate::config::{Config, ModuleConfig};
use crate::discovery::list_script_files;
use crate::error::{CoreError, CoreResult};
use crate::module_id::ModuleId;
use crate::selector::resolve_module_selector;
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File extension of exported archives.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

const METADATA_PREFIX: &str = "modgraph-module:";

/// Options for [`export_module`].
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Directory receiving the archive (current directory when unset)
    pub output_dir: Option<PathBuf>,
    /// Config override, resolved against the root
    pub config_path: Option<PathBuf>,
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportedModule {
    pub module_id: ModuleId,
    pub archive_path: PathBuf,
    /// Archived file names, sorted
    pub files: Vec<String>,
    /// Metadata embedded in the archive, if the config declared the module
    pub metadata: Option<ModuleConfig>,
    /// Non-fatal problems, e.g. exporting without metadata
    pub warnings: Vec<String>,
}

/// Options for [`import_module`].
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Replace an existing module directory
    pub overwrite: bool,
    /// Declare the module in the config from archive metadata
    pub merge_config: bool,
    /// Config override, resolved against the root
    pub config_path: Option<PathBuf>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            merge_config: true,
            config_path: None,
        }
    }
}

/// Result of a successful import.
#[derive(Debug, Clone)]
pub struct ImportedModule {
    pub module_id: ModuleId,
    /// Imported file names, sorted
    pub files: Vec<String>,
    /// Whether the config file was rewritten with a new module entry
    pub config_updated: bool,
    pub warnings: Vec<String>,
}

/// Package the module named by `selector` into `{moduleId}.tar.gz`.
///
/// The archive is written to a temp file in the output directory and renamed
/// into place, so a failed export never leaves a truncated archive behind.
pub fn export_module(
    root: &Path,
    selector: &str,
    options: &ExportOptions,
) -> CoreResult<ExportedModule> {
    let module_id = resolve_module_selector(root, selector)?;
    let module_dir = root.join(module_id.as_str());
    let scripts = list_script_files(&module_dir)?;

    let mut warnings = Vec::new();
    let metadata = export_metadata(root, &module_id, options, &mut warnings);
    for warning in &warnings {
        log::warn!("{warning}");
    }

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| CoreError::io("create directory", &output_dir, e))?;
    let archive_path = output_dir.join(format!("{module_id}.{ARCHIVE_EXTENSION}"));

    let tmp = tempfile::NamedTempFile::new_in(&output_dir)
        .map_err(|e| CoreError::io("create temp file in", &output_dir, e))?;
    let tmp = write_archive(tmp, &module_id, &scripts, metadata.as_ref())?;
    tmp.persist(&archive_path)
        .map_err(|e| CoreError::io("write", &archive_path, e.error))?;

    let files: Vec<String> = scripts.into_iter().map(|(name, _)| name).collect();
    log::info!(
        "Exported {} ({} files) to {}",
        module_id,
        files.len(),
        archive_path.display()
    );

    Ok(ExportedModule {
        module_id,
        archive_path,
        files,
        metadata,
        warnings,
    })
}

/// Look up the module's declaration, degrading to `None` with a warning.
fn export_metadata(
    root: &Path,
    module_id: &ModuleId,
    options: &ExportOptions,
    warnings: &mut Vec<String>,
) -> Option<ModuleConfig> {
    match Config::load_optional(root, options.config_path.as_deref()) {
        Ok(Some(config)) => match config.module(module_id) {
            Some(module) => Some(module.clone()),
            None => {
                warnings.push(format!(
                    "Module {module_id} is not declared in config; exporting without metadata"
                ));
                None
            }
        },
        Ok(None) => {
            warnings.push("No config file found; exporting without metadata".to_string());
            None
        }
        Err(e) => {
            warnings.push(format!("Config could not be loaded ({e}); exporting without metadata"));
            None
        }
    }
}

fn write_archive<W: Write>(
    out: W,
    module_id: &ModuleId,
    scripts: &[(String, PathBuf)],
    metadata: Option<&ModuleConfig>,
) -> CoreResult<W> {
    let mut gz = GzBuilder::new().filename(format!("{module_id}.tar"));
    if let Some(module) = metadata {
        let json = serde_json::to_string(module)?;
        gz = gz.comment(format!("{METADATA_PREFIX}{json}"));
    }
    let encoder = gz.write(out, Compression::default());

    let mut builder = tar::Builder::new(encoder);
    for (name, path) in scripts {
        let data = std::fs::read(path).map_err(|e| CoreError::io("read", path, e))?;
        // fixed mode and mtime keep archives reproducible
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_slice())
            .map_err(|e| CoreError::io("archive", path, e))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| CoreError::io("finish archive for", Path::new(module_id.as_str()), e))?;
    encoder
        .finish()
        .map_err(|e| CoreError::io("compress archive for", Path::new(module_id.as_str()), e))
}

/// Import a packaged module into `root/target_id`.
///
/// `package_path` may be a module directory or a `.tar.gz`/`.tgz` archive.
/// Files are staged in a hidden directory under `root` and renamed into
/// place, so the target is either fully replaced or left untouched.
///
/// As with [`export_module`], concurrent calls for the same module id must be
/// serialised by the caller.
pub fn import_module(
    root: &Path,
    target_id: &str,
    package_path: &Path,
    options: &ImportOptions,
) -> CoreResult<ImportedModule> {
    let module_id = ModuleId::parse(target_id)?;
    if !root.is_dir() {
        return Err(CoreError::RootNotFound {
            path: root.display().to_string(),
        });
    }
    if !package_path.exists() {
        return Err(CoreError::PackageNotFound {
            path: package_path.display().to_string(),
        });
    }

    let target = root.join(module_id.as_str());
    if target.exists() && !options.overwrite {
        return Err(CoreError::ModuleAlreadyExists {
            module: module_id.to_string(),
            path: target.display().to_string(),
        });
    }

    let mut warnings = Vec::new();
    let source = PackageSource::open(package_path, &mut warnings)?;
    let contents = read_scripts(&source.dir)?;
    if contents.is_empty() {
        warnings.push(format!(
            "Package {} contains no .{} files",
            package_path.display(),
            crate::migration::SCRIPT_EXTENSION
        ));
    }

    install(root, &target, &contents)?;
    let files: Vec<String> = contents.into_iter().map(|(name, _)| name).collect();
    log::info!(
        "Imported {} files into {}",
        files.len(),
        target.display()
    );

    let config_updated = match (&source.metadata, options.merge_config) {
        (Some(metadata), true) => merge_metadata(root, &module_id, metadata, options, &mut warnings),
        _ => false,
    };

    for warning in &warnings {
        log::warn!("{warning}");
    }

    Ok(ImportedModule {
        module_id,
        files,
        config_updated,
        warnings,
    })
}

/// Where package files are read from. Holds the scratch directory of an
/// unpacked archive so it lives until the import is done.
struct PackageSource {
    dir: PathBuf,
    metadata: Option<ModuleConfig>,
    _scratch: Option<TempDir>,
}

impl PackageSource {
    fn open(package_path: &Path, warnings: &mut Vec<String>) -> CoreResult<Self> {
        if package_path.is_dir() {
            return Ok(Self {
                dir: package_path.to_path_buf(),
                metadata: None,
                _scratch: None,
            });
        }
        if !is_archive(package_path) {
            return Err(CoreError::UnsupportedFormat {
                path: package_path.display().to_string(),
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("mg-import-")
            .tempdir()
            .map_err(|e| CoreError::io("create scratch directory for", package_path, e))?;
        let file = File::open(package_path).map_err(|e| CoreError::io("open", package_path, e))?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive
            .unpack(scratch.path())
            .map_err(|e| CoreError::io("unpack", package_path, e))?;

        let comment = archive
            .into_inner()
            .header()
            .and_then(|h| h.comment())
            .map(|c| String::from_utf8_lossy(c).into_owned());
        let metadata = comment.and_then(|c| parse_metadata(&c, package_path, warnings));

        let dir = single_top_level_dir(scratch.path())?.unwrap_or_else(|| scratch.path().to_path_buf());
        log::debug!(
            "Unpacked {} into {}",
            package_path.display(),
            dir.display()
        );
        Ok(Self {
            dir,
            metadata,
            _scratch: Some(scratch),
        })
    }
}

fn is_archive(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

fn parse_metadata(comment: &str, package_path: &Path, warnings: &mut Vec<String>) -> Option<ModuleConfig> {
    let json = comment.strip_prefix(METADATA_PREFIX)?;
    match serde_json::from_str(json) {
        Ok(module) => Some(module),
        Err(e) => {
            warnings.push(format!(
                "Ignoring unreadable module metadata in {}: {e}",
                package_path.display()
            ));
            None
        }
    }
}

/// The only top-level entry of `dir`, if there is exactly one and it is a directory.
fn single_top_level_dir(dir: &Path) -> CoreResult<Option<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::io("read directory", dir, e))? {
        let entry = entry.map_err(|e| CoreError::io("read directory", dir, e))?;
        entries.push(entry.path());
    }
    match entries.as_slice() {
        [only] if only.symlink_metadata().is_ok_and(|m| m.is_dir()) => Ok(Some(only.clone())),
        _ => Ok(None),
    }
}

/// Read every regular `.surql` file in `dir` into memory, sorted by name.
fn read_scripts(dir: &Path) -> CoreResult<Vec<(String, Vec<u8>)>> {
    let mut contents = Vec::new();
    for (name, path) in list_script_files(dir)? {
        // skip symlinks that may point outside the package
        if !path.symlink_metadata().is_ok_and(|m| m.is_file()) {
            log::debug!("Skipping non-regular file {}", path.display());
            continue;
        }
        let data = std::fs::read(&path).map_err(|e| CoreError::io("read", &path, e))?;
        contents.push((name, data));
    }
    Ok(contents)
}

/// Write `contents` into a staging directory and swap it into `target`.
fn install(root: &Path, target: &Path, contents: &[(String, Vec<u8>)]) -> CoreResult<()> {
    let staging = tempfile::Builder::new()
        .prefix(".mg-staging-")
        .tempdir_in(root)
        .map_err(|e| CoreError::io("create staging directory in", root, e))?;
    let staged = staging.path().join("module");
    std::fs::create_dir(&staged).map_err(|e| CoreError::io("create directory", &staged, e))?;
    for (name, data) in contents {
        let path = staged.join(name);
        std::fs::write(&path, data).map_err(|e| CoreError::io("write", &path, e))?;
    }

    if !target.exists() {
        return std::fs::rename(&staged, target).map_err(|e| CoreError::io("move into place", target, e));
    }

    let backup = tempfile::Builder::new()
        .prefix(".mg-backup-")
        .tempdir_in(root)
        .map_err(|e| CoreError::io("create backup directory in", root, e))?;
    let previous = backup.path().join("module");
    std::fs::rename(target, &previous).map_err(|e| CoreError::io("move aside", target, e))?;

    if let Err(e) = std::fs::rename(&staged, target) {
        if let Err(restore) = std::fs::rename(&previous, target) {
            log::error!(
                "Failed to restore {} from {}: {restore}",
                target.display(),
                previous.display()
            );
        }
        return Err(CoreError::io("move into place", target, e));
    }
    log::debug!("Replaced existing module at {}", target.display());
    Ok(())
}

/// Declare an imported module in the config from its archive metadata.
///
/// Returns whether the config was rewritten. Failures only produce warnings;
/// the module files are already in place.
fn merge_metadata(
    root: &Path,
    module_id: &ModuleId,
    metadata: &ModuleConfig,
    options: &ImportOptions,
    warnings: &mut Vec<String>,
) -> bool {
    let path = match Config::resolve_path(root, options.config_path.as_deref()) {
        Ok(path) => path,
        Err(CoreError::ConfigNotFound { .. }) => {
            log::debug!("No config to merge module metadata into");
            return false;
        }
        Err(e) => {
            warnings.push(format!("Config not updated: {e}"));
            return false;
        }
    };
    let config = match Config::load_file(&path) {
        Ok(config) => config,
        Err(e) => {
            warnings.push(format!("Config not updated: {e}"));
            return false;
        }
    };
    if config.modules().contains(module_id) {
        log::debug!("{module_id} already declared in {}", path.display());
        return false;
    }

    let mut module = metadata.clone();
    let (kept, dropped): (Vec<ModuleId>, Vec<ModuleId>) = module
        .dependencies
        .iter()
        .cloned()
        .partition(|dep| config.modules().contains(dep));
    for dep in dropped {
        warnings.push(format!(
            "Dropped dependency {dep} of {module_id}: not declared in {}",
            path.display()
        ));
    }
    module.dependencies = kept.into_iter().collect();

    match Config::add_module_to_file(&path, module_id.clone(), module) {
        Ok(updated) => updated,
        Err(e) => {
            warnings.push(format!("Config not updated: {e}"));
            false
        }
    }
}

#[cfg(test)]
#[path = "package_test.rs"]
mod tests;
