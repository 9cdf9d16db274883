//! Module Resolver
//!
//! Orders enabled modules so every `after`/`before` constraint holds. Modules
//! live in an arena indexed by declaration position; edges are adjacency sets.
//! Kahn's algorithm always releases the lowest ready declaration index, so
//! unconstrained modules keep their declared order.
//!
//! Constraints naming modules that are not enabled are ignored.

use super::ModuleRegistry;
use crate::error::PipelineError;
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Deterministic topological ordering of enabled modules.
pub struct ModuleResolver<'a> {
    registry: &'a ModuleRegistry,
}

struct ModuleGraph<'m> {
    names: Vec<&'m str>,
    /// `edges[a]` contains `b` when `a` must activate before `b`.
    edges: Vec<BTreeSet<usize>>,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Compute the activation order for the effective module list.
    ///
    /// Duplicate names keep their first position. Fails with `UnknownModule`
    /// for a name without a descriptor and `ModuleCycle` (carrying a shortest
    /// cycle) when constraints cannot all hold.
    pub fn resolve(&self, modules: &[String]) -> Result<Vec<String>, PipelineError> {
        let graph = self.build_graph(modules)?;
        let count = graph.names.len();

        let mut indegree = vec![0usize; count];
        for targets in &graph.edges {
            for &target in targets {
                indegree[target] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &target in &graph.edges[next] {
                indegree[target] -= 1;
                if indegree[target] == 0 {
                    ready.insert(target);
                }
            }
        }

        if order.len() < count {
            let blocked: BTreeSet<usize> = (0..count).filter(|&i| indegree[i] > 0).collect();
            let cycle = shortest_cycle(&graph.edges, &blocked)
                .into_iter()
                .map(|i| graph.names[i].to_string())
                .collect();
            return Err(PipelineError::ModuleCycle { cycle });
        }

        let resolved: Vec<String> = order
            .into_iter()
            .map(|i| graph.names[i].to_string())
            .collect();
        debug!(modules = ?resolved, "Resolved module activation order");
        Ok(resolved)
    }

    fn build_graph<'m>(&self, modules: &'m [String]) -> Result<ModuleGraph<'m>, PipelineError> {
        let mut names: Vec<&str> = Vec::with_capacity(modules.len());
        let mut index: HashMap<&str, usize> = HashMap::new();
        for name in modules {
            if !index.contains_key(name.as_str()) {
                index.insert(name.as_str(), names.len());
                names.push(name.as_str());
            }
        }

        let mut edges = vec![BTreeSet::new(); names.len()];
        for (position, name) in names.iter().enumerate() {
            let descriptor =
                self.registry
                    .get(name)
                    .ok_or_else(|| PipelineError::UnknownModule {
                        name: name.to_string(),
                    })?;
            for predecessor in &descriptor.after {
                if let Some(&from) = index.get(predecessor.as_str()) {
                    edges[from].insert(position);
                }
            }
            for successor in &descriptor.before {
                if let Some(&to) = index.get(successor.as_str()) {
                    edges[position].insert(to);
                }
            }
        }

        Ok(ModuleGraph { names, edges })
    }
}

/// Shortest cycle among `blocked` nodes, rotated to start at its lowest index.
///
/// Every node left blocked by Kahn's algorithm lies on or downstream of a
/// cycle, so a breadth-first search back to the start finds one.
fn shortest_cycle(edges: &[BTreeSet<usize>], blocked: &BTreeSet<usize>) -> Vec<usize> {
    let mut best: Option<Vec<usize>> = None;

    for &start in blocked {
        let mut parent: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut closing = None;

        'search: while let Some(node) = queue.pop_front() {
            for &next in &edges[node] {
                if !blocked.contains(&next) {
                    continue;
                }
                if next == start {
                    closing = Some(node);
                    break 'search;
                }
                if !parent.contains_key(&next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        let Some(mut node) = closing else {
            continue;
        };
        let mut cycle = vec![node];
        while node != start {
            node = parent[&node];
            cycle.push(node);
        }
        cycle.reverse();

        if best.as_ref().map_or(true, |b| cycle.len() < b.len()) {
            best = Some(cycle);
        }
    }

    best.unwrap_or_default()
}
