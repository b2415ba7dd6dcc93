//! Module dependency graph and execution ordering

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::module_id::ModuleId;
use crate::validation::detect_cycles;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

/// A directed acyclic graph of module dependencies.
///
/// Edges point from a dependency to its dependent, so a topological walk
/// yields dependencies first.
#[derive(Debug)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleId, ()>,
    node_map: HashMap<ModuleId, NodeIndex>,
    locks: HashMap<ModuleId, String>,
}

impl ModuleGraph {
    /// Build the graph from a validated config.
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut locks = HashMap::new();

        for (id, module) in config.modules().iter() {
            let idx = graph.add_node(id.clone());
            node_map.insert(id.clone(), idx);
            if module.locked {
                let reason = module
                    .lock_reason
                    .clone()
                    .unwrap_or_else(|| "locked".to_string());
                locks.insert(id.clone(), reason);
            }
        }

        for (id, module) in config.modules().iter() {
            let to = node_map[id];
            for dep in &module.dependencies {
                let Some(&from) = node_map.get(dep) else {
                    return Err(CoreError::ModuleNotFound {
                        selector: dep.to_string(),
                    });
                };
                graph.add_edge(from, to, ());
            }
        }

        let dag = Self {
            graph,
            node_map,
            locks,
        };
        dag.validate()?;
        Ok(dag)
    }

    /// Validate the graph has no cycles
    fn validate(&self) -> CoreResult<()> {
        let snapshot: Vec<(ModuleId, Vec<String>)> = self
            .graph
            .node_indices()
            .map(|idx| (self.graph[idx].clone(), self.dependencies_of(idx)))
            .collect();
        let view: Vec<(&str, Vec<&str>)> = snapshot
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.iter().map(String::as_str).collect()))
            .collect();

        match detect_cycles(&view).into_iter().next() {
            Some(cycle) => Err(CoreError::CircularDependency {
                cycle: cycle.join(" → "),
            }),
            None => Ok(()),
        }
    }

    /// All modules in apply order (dependencies first).
    ///
    /// Ties between independent modules are broken by id, so the order is
    /// stable for a given graph.
    pub fn apply_order(&self) -> Vec<ModuleId> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let deg = self.graph.edges_directed(idx, Direction::Incoming).count();
                (idx, deg)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<(ModuleId, NodeIndex)>> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&idx, _)| Reverse((self.graph[idx].clone(), idx)))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((id, idx))) = ready.pop() {
            order.push(id);
            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let next = edge.target();
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse((self.graph[next].clone(), next)));
                    }
                }
            }
        }
        order
    }

    /// All modules in rollback order (dependents first).
    pub fn rollback_order(&self) -> Vec<ModuleId> {
        let mut order = self.apply_order();
        order.reverse();
        order
    }

    /// Modules needed to apply `targets`: the targets and everything they
    /// transitively depend on, in apply order.
    pub fn apply_plan(&self, targets: &[ModuleId]) -> CoreResult<Vec<ModuleId>> {
        let mut selected = BTreeSet::new();
        for target in targets {
            self.require(target)?;
            selected.insert(target.clone());
            selected.extend(self.ancestors(target));
        }
        Ok(self
            .apply_order()
            .into_iter()
            .filter(|m| selected.contains(m))
            .collect())
    }

    /// Modules rolled back with `targets`: the targets and everything that
    /// transitively depends on them, in rollback order.
    ///
    /// Fails with [`CoreError::ModuleLocked`] if any module in the plan is
    /// locked, unless `force` is set.
    pub fn rollback_plan(&self, targets: &[ModuleId], force: bool) -> CoreResult<Vec<ModuleId>> {
        let mut selected = BTreeSet::new();
        for target in targets {
            self.require(target)?;
            selected.insert(target.clone());
            selected.extend(self.descendants(target));
        }
        let plan: Vec<ModuleId> = self
            .rollback_order()
            .into_iter()
            .filter(|m| selected.contains(m))
            .collect();

        for id in &plan {
            if let Some(reason) = self.locks.get(id) {
                if !force {
                    return Err(CoreError::ModuleLocked {
                        module: id.to_string(),
                        reason: reason.clone(),
                    });
                }
                log::warn!("Rolling back locked module {id} (forced): {reason}");
            }
        }
        Ok(plan)
    }

    fn require(&self, id: &str) -> CoreResult<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| CoreError::ModuleNotFound {
                selector: id.to_string(),
            })
    }

    fn dependencies_of(&self, idx: NodeIndex) -> Vec<String> {
        let mut deps: Vec<String> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| self.graph[e.source()].to_string())
            .collect();
        deps.sort();
        deps
    }

    /// Direct dependencies of a module, sorted
    pub fn dependencies(&self, module: &str) -> Vec<String> {
        match self.node_map.get(module) {
            Some(&idx) => self.dependencies_of(idx),
            None => Vec::new(),
        }
    }

    /// Direct dependents of a module, sorted
    pub fn dependents(&self, module: &str) -> Vec<String> {
        let Some(&idx) = self.node_map.get(module) else {
            return Vec::new();
        };
        let mut deps: Vec<String> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| self.graph[e.target()].to_string())
            .collect();
        deps.sort();
        deps
    }

    /// All transitive dependencies of a module
    pub fn ancestors(&self, module: &str) -> BTreeSet<ModuleId> {
        self.collect_reachable(module, Direction::Incoming)
    }

    /// All transitive dependents of a module
    pub fn descendants(&self, module: &str) -> BTreeSet<ModuleId> {
        self.collect_reachable(module, Direction::Outgoing)
    }

    fn collect_reachable(&self, module: &str, direction: Direction) -> BTreeSet<ModuleId> {
        let mut result = BTreeSet::new();
        let Some(&start) = self.node_map.get(module) else {
            return result;
        };
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, direction) {
                let neighbor = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                if visited.insert(neighbor) {
                    result.insert(self.graph[neighbor].clone());
                    stack.push(neighbor);
                }
            }
        }
        result
    }

    /// Whether a module is locked, with its reason
    pub fn lock_reason(&self, module: &str) -> Option<&str> {
        self.locks.get(module).map(String::as_str)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.node_map.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
