//! Lint engine: cross-checks migration files on disk against the config.
//!
//! Data-quality problems are reported as [`Finding`]s and never abort the
//! run. Only I/O failures on the migrations root itself are returned as
//! errors.

use crate::config::{Config, CONFIG_FILE_NAMES};
use crate::discovery::{discover_modules, DiscoveredModule, Discovery};
use crate::error::{CoreError, CoreResult};
use crate::migration::MigrationFile;
use crate::validation::ViolationKind;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Severity of a lint finding. Only errors fail a lint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Lint rules and their fixed severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    SafeDrop,
    IdempotentCreate,
    SafeConcatenation,
    MigrationPairs,
    MigrationNaming,
    MigrationSequence,
    MigrationRead,
    ModuleNaming,
    CircularDependency,
    ConfigMissing,
    ConfigSyntax,
    ConfigStructure,
    ConfigSync,
    ConfigAnalysis,
}

impl Rule {
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::SafeDrop => "safe-drop",
            Rule::IdempotentCreate => "idempotent-create",
            Rule::SafeConcatenation => "safe-concatenation",
            Rule::MigrationPairs => "migration-pairs",
            Rule::MigrationNaming => "migration-naming",
            Rule::MigrationSequence => "migration-sequence",
            Rule::MigrationRead => "migration-read",
            Rule::ModuleNaming => "module-naming",
            Rule::CircularDependency => "circular-dependency",
            Rule::ConfigMissing => "config-missing",
            Rule::ConfigSyntax => "config-syntax",
            Rule::ConfigStructure => "config-structure",
            Rule::ConfigSync => "config-sync",
            Rule::ConfigAnalysis => "config-analysis",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Rule::SafeDrop
            | Rule::IdempotentCreate
            | Rule::SafeConcatenation
            | Rule::MigrationNaming
            | Rule::MigrationRead
            | Rule::ConfigMissing
            | Rule::ConfigSync => Severity::Warning,
            Rule::MigrationPairs
            | Rule::MigrationSequence
            | Rule::ModuleNaming
            | Rule::CircularDependency
            | Rule::ConfigSyntax
            | Rule::ConfigStructure
            | Rule::ConfigAnalysis => Severity::Error,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lint observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Path relative to the migrations root, `/`-separated
    pub file: String,
    /// 1-based line number for content rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub severity: Severity,
    pub rule: Rule,
    pub message: String,
}

impl Finding {
    fn new(rule: Rule, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            severity: rule.severity(),
            rule,
            message: message.into(),
        }
    }

    fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// `file` or `file:line`
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{}", self.file, line),
            None => self.file.clone(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.severity,
            self.rule,
            self.message,
            self.location()
        )
    }
}

/// Ordered lint findings for one migrations root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub findings: Vec<Finding>,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// A run succeeds when it has no error findings; warnings never fail it.
    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }

    pub fn by_rule(&self, rule: Rule) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.rule == rule)
    }

    pub fn has_circular_dependency(&self) -> bool {
        self.by_rule(Rule::CircularDependency).next().is_some()
    }
}

/// Lint the migrations under `root`.
///
/// Findings are ordered by module directory name, then by file and line
/// within each module; config findings come last.
pub fn lint(root: &Path, config_override: Option<&Path>) -> CoreResult<LintReport> {
    let discovery = discover_modules(root)?;
    let mut findings = Vec::new();

    let mut modules = discovery.modules.iter().peekable();
    let mut rejected = discovery.rejected_dirs.iter().peekable();
    loop {
        let take_module = match (modules.peek(), rejected.peek()) {
            (Some(m), Some(r)) => m.id.as_str() < r.name.as_str(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if take_module {
            if let Some(module) = modules.next() {
                lint_module(module, &mut findings);
            }
        } else if let Some(dir) = rejected.next() {
            findings.push(Finding::new(
                Rule::ModuleNaming,
                dir.name.as_str(),
                format!(
                    "Module directory '{}' must follow naming convention NNN_name (e.g. 000_admin, 010_auth)",
                    dir.name
                ),
            ));
        }
    }

    lint_config(root, config_override, &discovery, &mut findings);

    log::debug!(
        "Lint of {} produced {} findings",
        root.display(),
        findings.len()
    );
    Ok(LintReport { findings })
}

fn lint_module(module: &DiscoveredModule, findings: &mut Vec<Finding>) {
    if let Some(error) = &module.read_error {
        findings.push(Finding::new(
            Rule::MigrationRead,
            module.id.as_str(),
            format!("Cannot list module directory - its migrations were not checked: {error}"),
        ));
    }

    for file in &module.files {
        let rel = format!("{}/{}", module.id, file.file_name());
        match std::fs::read(&file.path) {
            Ok(bytes) => lint_content(&rel, &String::from_utf8_lossy(&bytes), findings),
            Err(e) => {
                log::warn!("Cannot read {}: {}", file.path.display(), e);
                findings.push(Finding::new(
                    Rule::MigrationRead,
                    rel,
                    format!("Cannot read migration file - its content was not checked: {e}"),
                ));
            }
        }
    }

    for name in &module.malformed {
        findings.push(Finding::new(
            Rule::MigrationNaming,
            format!("{}/{}", module.id, name),
            "Migration file must be named NNNN_label_up.surql or NNNN_label_down.surql",
        ));
    }

    let mut labels_by_sequence: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for file in &module.files {
        labels_by_sequence
            .entry(file.sequence.as_str())
            .or_default()
            .insert(file.label.as_str());
    }
    for (sequence, labels) in &labels_by_sequence {
        if labels.len() > 1 {
            findings.push(Finding::new(
                Rule::MigrationSequence,
                module.id.as_str(),
                format!(
                    "Sequence {} is used by more than one migration: {}",
                    sequence,
                    labels.iter().copied().collect::<Vec<_>>().join(", ")
                ),
            ));
        }
    }

    let names: BTreeSet<String> = module.files.iter().map(MigrationFile::file_name).collect();
    for file in &module.files {
        let counterpart = file.counterpart_name();
        if names.contains(&counterpart) {
            continue;
        }
        let message = match file.direction {
            crate::migration::Direction::Up => {
                format!("Missing corresponding down migration: {counterpart}")
            }
            crate::migration::Direction::Down => {
                format!("Orphaned down migration - missing up migration: {counterpart}")
            }
        };
        findings.push(Finding::new(
            Rule::MigrationPairs,
            format!("{}/{}", module.id, file.file_name()),
            message,
        ));
    }
}

const SCHEMA_OBJECTS: &str =
    "TABLE|INDEX|FIELD|EVENT|FUNCTION|PARAM|ANALYZER|USER|ACCESS|SCOPE|TOKEN|NAMESPACE|DATABASE";

static DROP_RE: OnceLock<Regex> = OnceLock::new();
static CREATE_RE: OnceLock<Regex> = OnceLock::new();

fn drop_re() -> &'static Regex {
    DROP_RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^(DROP|REMOVE)\s+({SCHEMA_OBJECTS})\b"))
            .expect("drop pattern is valid")
    })
}

fn create_re() -> &'static Regex {
    CREATE_RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^(DEFINE|CREATE)\s+({SCHEMA_OBJECTS})\b"))
            .expect("create pattern is valid")
    })
}

/// Line-level heuristics on a script body.
fn lint_content(file: &str, content: &str, findings: &mut Vec<Finding>) {
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with("--")
            || trimmed.starts_with("//")
            || trimmed.starts_with('#')
        {
            continue;
        }
        let upper = trimmed.to_ascii_uppercase();

        if drop_re().is_match(trimmed) && !upper.contains("IF EXISTS") {
            findings.push(
                Finding::new(
                    Rule::SafeDrop,
                    file,
                    "Consider using IF EXISTS for DROP/REMOVE operations to avoid errors",
                )
                .at_line(line_no),
            );
        }

        if create_re().is_match(trimmed)
            && !upper.contains("IF NOT EXISTS")
            && !upper.contains("OVERWRITE")
        {
            findings.push(
                Finding::new(
                    Rule::IdempotentCreate,
                    file,
                    "Consider using IF NOT EXISTS for CREATE/DEFINE operations for idempotency",
                )
                .at_line(line_no),
            );
        }

        if trimmed.contains("' +") || trimmed.contains("\" +") {
            findings.push(
                Finding::new(
                    Rule::SafeConcatenation,
                    file,
                    "Potential string concatenation detected - ensure proper escaping",
                )
                .at_line(line_no),
            );
        }
    }
}

fn lint_config(
    root: &Path,
    config_override: Option<&Path>,
    discovery: &Discovery,
    findings: &mut Vec<Finding>,
) {
    let path = match Config::resolve_path(root, config_override) {
        Ok(path) => path,
        Err(CoreError::ConfigNotFound { .. }) => {
            let name = config_override
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| CONFIG_FILE_NAMES[0].to_string());
            findings.push(Finding::new(
                Rule::ConfigMissing,
                name,
                "No config file found - module dependencies cannot be validated",
            ));
            return;
        }
        Err(e) => {
            let name = config_override
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| CONFIG_FILE_NAMES[0].to_string());
            findings.push(Finding::new(
                Rule::ConfigAnalysis,
                name,
                format!("Config could not be analyzed: {e}"),
            ));
            return;
        }
    };
    let file = relative_name(root, &path);

    let config = match Config::load_file(&path) {
        Ok(config) => config,
        Err(CoreError::ConfigParse { message, .. }) => {
            findings.push(Finding::new(
                Rule::ConfigSyntax,
                file,
                format!("Invalid config syntax: {message}"),
            ));
            return;
        }
        Err(CoreError::ConfigValidation { violations, .. }) => {
            for violation in violations {
                let finding = if violation.kind == ViolationKind::CircularDependency {
                    Finding::new(Rule::CircularDependency, file.as_str(), violation.message)
                } else {
                    Finding::new(Rule::ConfigStructure, file.as_str(), violation.to_string())
                };
                findings.push(finding);
            }
            return;
        }
        Err(e) => {
            findings.push(Finding::new(
                Rule::ConfigAnalysis,
                file,
                format!("Config could not be analyzed: {e}"),
            ));
            return;
        }
    };

    for module in &discovery.modules {
        if config.module(&module.id).is_none() {
            findings.push(Finding::new(
                Rule::ConfigSync,
                file.as_str(),
                format!("Module directory \"{}\" not found in config", module.id),
            ));
        }
    }
    for id in config.modules().ids() {
        if discovery.module(id).is_none() {
            findings.push(Finding::new(
                Rule::ConfigSync,
                file.as_str(),
                format!("Module \"{id}\" is declared in config but has no directory"),
            ));
        }
    }
}

/// Display `path` relative to `root` when it lives inside it.
fn relative_name(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
#[path = "lint_test.rs"]
mod tests;
