//! Structural validation of a parsed config document.
//!
//! Validation never stops at the first problem: every violation in the
//! document is collected so an operator can fix them all in one pass.

use crate::config::{Config, ModuleConfig, Settings};
use crate::module_id::ModuleId;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Category of a config violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    InvalidRoot,
    MissingModules,
    InvalidModuleId,
    InvalidModule,
    MissingName,
    InvalidDependencies,
    UnknownDependency,
    MissingLockReason,
    InvalidEnvironments,
    InvalidSettings,
    CircularDependency,
}

/// A single structural problem found in a config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `modules.010_auth.dependencies`
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
    /// Module ids along a dependency cycle, first id repeated at the end
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycle: Vec<String>,
}

impl Violation {
    fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
            cycle: Vec::new(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed config document and build the typed [`Config`].
pub(crate) fn build_config(doc: &Value) -> Result<Config, Vec<Violation>> {
    let mut violations = Vec::new();

    let Some(root) = doc.as_object() else {
        return Err(vec![Violation::new(
            "$",
            ViolationKind::InvalidRoot,
            "configuration must be a JSON object",
        )]);
    };

    let mut modules = Vec::new();
    match root.get("modules") {
        Some(Value::Object(raw_modules)) => {
            let declared: BTreeSet<&str> = raw_modules.keys().map(String::as_str).collect();
            for (id, raw) in raw_modules {
                if let Some(module) = validate_module(id, raw, &declared, &mut violations) {
                    modules.push(module);
                }
            }

            let graph: Vec<(&str, Vec<&str>)> = raw_modules
                .iter()
                .map(|(id, raw)| (id.as_str(), raw_dependencies(raw)))
                .collect();
            for cycle in detect_cycles(&graph) {
                violations.push(Violation {
                    field: "modules".to_string(),
                    kind: ViolationKind::CircularDependency,
                    message: format!("Circular dependency detected: {}", cycle.join(" → ")),
                    cycle,
                });
            }
        }
        other => violations.push(Violation::new(
            "modules",
            ViolationKind::MissingModules,
            format!(
                "modules field is required and must be an object (found {})",
                json_type(other)
            ),
        )),
    }

    let environments = match root.get("environments") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
        ),
        Some(other) => {
            violations.push(Violation::new(
                "environments",
                ViolationKind::InvalidEnvironments,
                format!(
                    "environments must be an array of strings (found {})",
                    json_type(Some(other))
                ),
            ));
            None
        }
    };

    let settings = match root.get("settings") {
        None | Some(Value::Null) => None,
        Some(raw @ Value::Object(_)) => match serde_json::from_value::<Settings>(raw.clone()) {
            Ok(settings) => Some(settings),
            Err(e) => {
                violations.push(Violation::new(
                    "settings",
                    ViolationKind::InvalidSettings,
                    format!("invalid settings: {e}"),
                ));
                None
            }
        },
        Some(other) => {
            violations.push(Violation::new(
                "settings",
                ViolationKind::InvalidSettings,
                format!("settings must be an object (found {})", json_type(Some(other))),
            ));
            None
        }
    };

    if violations.is_empty() {
        Ok(Config::from_parts(modules, environments, settings))
    } else {
        Err(violations)
    }
}

/// Check one module entry. Returns the typed module only when it is fully valid.
fn validate_module(
    id: &str,
    raw: &Value,
    declared: &BTreeSet<&str>,
    violations: &mut Vec<Violation>,
) -> Option<(ModuleId, ModuleConfig)> {
    let field = format!("modules.{id}");
    let before = violations.len();

    let module_id = ModuleId::try_new(id);
    if module_id.is_none() {
        violations.push(Violation::new(
            &field,
            ViolationKind::InvalidModuleId,
            format!("module id '{id}' must follow pattern NNN_name (e.g. 010_auth)"),
        ));
    }

    let Some(obj) = raw.as_object() else {
        violations.push(Violation::new(
            &field,
            ViolationKind::InvalidModule,
            format!("module configuration must be an object (found {})", json_type(Some(raw))),
        ));
        return None;
    };

    let name = match obj.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => {
            violations.push(Violation::new(
                format!("{field}.name"),
                ViolationKind::MissingName,
                "module name is required and must be a non-empty string",
            ));
            None
        }
    };

    let mut dependencies = BTreeSet::new();
    match obj.get("dependencies") {
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(dep) => {
                        if let Some(dep_id) = ModuleId::try_new(dep) {
                            dependencies.insert(dep_id);
                        }
                    }
                    None => violations.push(Violation::new(
                        format!("{field}.dependencies[{index}]"),
                        ViolationKind::InvalidDependencies,
                        format!("dependency must be a string (found {})", json_type(Some(item))),
                    )),
                }
            }
            let mut reported = BTreeSet::new();
            for dep in items.iter().filter_map(Value::as_str) {
                if !declared.contains(dep) && reported.insert(dep) {
                    violations.push(Violation::new(
                        format!("{field}.dependencies"),
                        ViolationKind::UnknownDependency,
                        format!("dependency '{dep}' does not exist in modules"),
                    ));
                }
            }
        }
        other => violations.push(Violation::new(
            format!("{field}.dependencies"),
            ViolationKind::InvalidDependencies,
            format!(
                "module dependencies must be an array of strings (found {})",
                json_type(other)
            ),
        )),
    }

    let description = optional_string(obj, "description", &field, violations);
    let lock_reason = optional_string(obj, "lockReason", &field, violations);
    let locked = match obj.get("locked") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            violations.push(Violation::new(
                format!("{field}.locked"),
                ViolationKind::InvalidModule,
                format!("locked must be a boolean (found {})", json_type(Some(other))),
            ));
            false
        }
    };
    if locked && lock_reason.as_deref().is_none_or(|r| r.trim().is_empty()) {
        violations.push(Violation::new(
            format!("{field}.lockReason"),
            ViolationKind::MissingLockReason,
            "lockReason is required when a module is locked",
        ));
    }

    if violations.len() != before {
        return None;
    }
    Some((
        module_id?,
        ModuleConfig {
            name: name?,
            description,
            dependencies,
            locked,
            lock_reason,
        },
    ))
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(Violation::new(
                format!("{field}.{key}"),
                ViolationKind::InvalidModule,
                format!("{key} must be a string (found {})", json_type(Some(other))),
            ));
            None
        }
    }
}

/// String dependencies of a raw module entry, in declaration order.
fn raw_dependencies(raw: &Value) -> Vec<&str> {
    raw.get("dependencies")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn json_type(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Find dependency cycles with a depth-first search.
///
/// `graph` lists each module with its dependencies, both in declaration
/// order. Roots are visited in declaration order; the first module reached
/// again while still on the recursion stack closes a cycle, reported as
/// `[m, ..., m]`. Traversal from that root then stops. Dependencies that are
/// not declared in `graph` are skipped.
pub fn detect_cycles(graph: &[(&str, Vec<&str>)]) -> Vec<Vec<String>> {
    let index: HashMap<&str, usize> = graph
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i))
        .collect();

    let mut visited = vec![false; graph.len()];
    let mut cycles = Vec::new();

    for root in 0..graph.len() {
        if visited[root] {
            continue;
        }
        let mut on_stack = vec![false; graph.len()];
        let mut path = Vec::new();
        if let Some(cycle) = visit(root, graph, &index, &mut visited, &mut on_stack, &mut path) {
            cycles.push(cycle);
        }
    }

    cycles
}

fn visit(
    node: usize,
    graph: &[(&str, Vec<&str>)],
    index: &HashMap<&str, usize>,
    visited: &mut [bool],
    on_stack: &mut [bool],
    path: &mut Vec<usize>,
) -> Option<Vec<String>> {
    visited[node] = true;
    on_stack[node] = true;
    path.push(node);

    for dep in &graph[node].1 {
        let Some(&next) = index.get(dep) else {
            continue;
        };
        if on_stack[next] {
            let start = path.iter().position(|&p| p == next).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..]
                .iter()
                .map(|&i| graph[i].0.to_string())
                .collect();
            cycle.push(graph[next].0.to_string());
            return Some(cycle);
        }
        if !visited[next] {
            if let Some(cycle) = visit(next, graph, index, visited, on_stack, path) {
                return Some(cycle);
            }
        }
    }

    on_stack[node] = false;
    path.pop();
    None
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
