//! Configuration types and loading for the module `config.json`

use crate::error::{CoreError, CoreResult};
use crate::module_id::ModuleId;
use crate::validation;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Config file names looked up in a migrations root, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["config.json", "config.yaml", "config.yml"];

/// Root configuration loaded from `config.json`.
///
/// A loaded `Config` is read-only. Generator-style operations (init, import)
/// rewrite the backing file through [`Config::write_atomic`] instead of
/// mutating a shared instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    modules: ModuleMap,

    #[serde(skip_serializing_if = "Option::is_none")]
    environments: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<Settings>,
}

/// Declared metadata for a single module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Display name
    pub name: String,

    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Modules that must be fully applied before this one
    #[serde(default)]
    pub dependencies: BTreeSet<ModuleId>,

    /// Locked modules refuse rollback unless forced
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,

    /// Why the module is locked (required when `locked`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_reason: Option<String>,
}

/// Global settings block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_format: Option<ConfigFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_transactions: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,
}

/// Preferred on-disk config format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Yaml,
}

/// Modules in declaration order, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleMap(Vec<(ModuleId, ModuleConfig)>);

impl ModuleMap {
    pub fn get(&self, id: &str) -> Option<&ModuleConfig> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|(k, _)| k == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &ModuleConfig)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.0.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert a module, keeping declaration order. Returns `false` if the id
    /// was already declared (the existing entry is left untouched).
    fn insert(&mut self, id: ModuleId, module: ModuleConfig) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push((id, module));
        true
    }
}

impl Serialize for ModuleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, module) in &self.0 {
            map.serialize_entry(id, module)?;
        }
        map.end()
    }
}

impl Config {
    pub(crate) fn from_parts(
        modules: Vec<(ModuleId, ModuleConfig)>,
        environments: Option<Vec<String>>,
        settings: Option<Settings>,
    ) -> Self {
        let mut map = ModuleMap::default();
        for (id, module) in modules {
            map.insert(id, module);
        }
        Self {
            modules: map,
            environments,
            settings,
        }
    }

    /// Find the config file in a migrations root, trying [`CONFIG_FILE_NAMES`] in order.
    pub fn find(root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    /// Resolve the config path from an optional override.
    ///
    /// Relative overrides are resolved against `root`.
    pub fn resolve_path(root: &Path, config_override: Option<&Path>) -> CoreResult<PathBuf> {
        match config_override {
            Some(p) => {
                let path = if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    root.join(p)
                };
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(CoreError::ConfigNotFound {
                        path: path.display().to_string(),
                    })
                }
            }
            None => Self::find(root).ok_or_else(|| CoreError::ConfigNotFound {
                path: root.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Load and validate the config for a migrations root.
    pub fn load(root: &Path, config_override: Option<&Path>) -> CoreResult<Self> {
        let path = Self::resolve_path(root, config_override)?;
        Self::load_file(&path)
    }

    /// Like [`load`](Self::load) but returns `Ok(None)` when no config file exists.
    pub fn load_optional(root: &Path, config_override: Option<&Path>) -> CoreResult<Option<Self>> {
        match Self::load(root, config_override) {
            Ok(config) => Ok(Some(config)),
            Err(CoreError::ConfigNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load and validate a specific config file.
    pub fn load_file(path: &Path) -> CoreResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| CoreError::io("read", path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| CoreError::ConfigParse {
            path: path.display().to_string(),
            message: format!("config is not valid UTF-8: {}", e.utf8_error()),
        })?;
        let config = Self::parse(&content, path)?;
        log::debug!(
            "Loaded {} modules from {}",
            config.modules.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate config content. `path` selects the format by
    /// extension and is used in error messages.
    pub fn parse(content: &str, path: &Path) -> CoreResult<Self> {
        let doc = parse_document(content, path)?;
        validation::build_config(&doc).map_err(|violations| CoreError::ConfigValidation {
            path: path.display().to_string(),
            violations,
        })
    }

    /// Build a default config for a set of module directories.
    ///
    /// Modules are sorted by id and each depends on its predecessor.
    pub fn scaffold(module_ids: &[ModuleId]) -> Self {
        let mut ids = module_ids.to_vec();
        ids.sort();
        ids.dedup();

        let mut modules = Vec::with_capacity(ids.len());
        let mut previous: Option<ModuleId> = None;
        for id in ids {
            let module = ModuleConfig {
                name: display_name(id.name()),
                description: Some(format!("{} module", id.name())),
                dependencies: previous.iter().cloned().collect(),
                locked: false,
                lock_reason: None,
            };
            previous = Some(id.clone());
            modules.push((id, module));
        }

        Self::from_parts(
            modules,
            None,
            Some(Settings {
                config_format: Some(ConfigFormat::Json),
                use_transactions: Some(true),
                ..Settings::default()
            }),
        )
    }

    pub fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    pub fn module(&self, id: &str) -> Option<&ModuleConfig> {
        self.modules.get(id)
    }

    pub fn environments(&self) -> &[String] {
        self.environments.as_deref().unwrap_or_default()
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// Serialize as pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Write the config to `path` atomically (temp file in the same directory,
    /// then rename).
    pub fn write_atomic(&self, path: &Path) -> CoreResult<()> {
        let content = self.to_json_pretty()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| CoreError::io("create temp file in", dir, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| CoreError::io("write", tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| CoreError::io("replace", path, e.error))?;
        Ok(())
    }

    /// Add a module declaration and atomically rewrite the config at `path`.
    ///
    /// The file is re-read and re-validated first so the change applies on top
    /// of the current on-disk state. Returns `false` without writing when the
    /// module is already declared.
    pub(crate) fn add_module_to_file(
        path: &Path,
        id: ModuleId,
        module: ModuleConfig,
    ) -> CoreResult<bool> {
        let mut updated = Self::load_file(path)?;
        if !updated.modules.insert(id, module) {
            return Ok(false);
        }
        // guard against writing a graph the loader would reject
        let doc = serde_json::to_value(&updated)?;
        validation::build_config(&doc).map_err(|violations| CoreError::ConfigValidation {
            path: path.display().to_string(),
            violations,
        })?;
        updated.write_atomic(path)?;
        Ok(true)
    }
}

/// Parse raw config content into a JSON document according to the file extension.
fn parse_document(content: &str, path: &Path) -> CoreResult<serde_json::Value> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let parse_err = |message: String| CoreError::ConfigParse {
        path: path.display().to_string(),
        message,
    };

    match ext.as_str() {
        "json" => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        "yaml" | "yml" => {
            // only the JSON-compatible subset of YAML is accepted
            let body: String = content
                .lines()
                .filter(|line| !line.trim_start().starts_with('#'))
                .collect::<Vec<_>>()
                .join("\n");
            if !body.trim_start().starts_with('{') {
                return Err(parse_err(
                    "YAML syntax is not supported; write the file as JSON-shaped content or use config.json"
                        .to_string(),
                ));
            }
            serde_json::from_str(&body).map_err(|e| parse_err(e.to_string()))
        }
        other => Err(parse_err(format!(
            "unsupported config format '.{other}' (supported: .json, .yaml, .yml)"
        ))),
    }
}

/// `user_auth` -> `User auth`
fn display_name(suffix: &str) -> String {
    let spaced = suffix.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
