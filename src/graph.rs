//! Reference Graph
//!
//! petgraph view of `$ref` dependencies between named schemas. Used to report
//! reference cycles for a whole document up front; the resolver still guards
//! every individual validation with its own stack.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;
use std::collections::HashMap;

use crate::index::SchemaIndex;
use crate::schema::{ref_target, subschemas};

/// Directed graph: an edge A -> B means schema A contains a `$ref` into B
#[derive(Debug)]
pub struct RefGraph {
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
}

impl RefGraph {
    /// Collect every `$ref` in schema positions of every indexed schema
    pub fn build(root: &Value, index: &SchemaIndex) -> Self {
        let mut graph = DiGraph::with_capacity(index.len(), index.len() * 2);
        let mut node_indices = HashMap::with_capacity(index.len());

        for name in index.names() {
            let idx = graph.add_node(name.to_string());
            node_indices.insert(name.to_string(), idx);
        }

        // Pointer prefix -> owning schema name, so deep refs map to their owner
        let owners: Vec<(&str, &str)> = index
            .entries()
            .iter()
            .map(|e| (e.pointer.as_str(), e.name.as_str()))
            .collect();

        for entry in index.entries() {
            let Some(node) = index.get(root, &entry.name) else {
                continue;
            };
            let mut refs = Vec::new();
            collect_refs(node.value(), &mut refs);

            let from = node_indices[&entry.name];
            for target in refs {
                if let Some(owner) = owner_of(target, &owners) {
                    let to = node_indices[owner];
                    if graph.find_edge(from, to).is_none() {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        Self { graph, node_indices }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Schemas `name` refers to directly, sorted
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Groups of schemas that reference each other in a cycle.
    ///
    /// Each group is sorted; groups are sorted by their first member.
    /// A schema referencing itself forms a group of one.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&idx| self.graph.find_edge(idx, idx).is_some())
            })
            .map(|scc| {
                let mut names: Vec<String> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect();
                names.sort();
                names
            })
            .collect();
        groups.sort();
        groups
    }

    /// Whether `name` takes part in any reference cycle
    pub fn is_cyclic(&self, name: &str) -> bool {
        self.cycles().iter().any(|group| group.iter().any(|n| n == name))
    }
}

fn collect_refs<'a>(schema: &'a Value, refs: &mut Vec<&'a str>) {
    if let Some(target) = ref_target(schema) {
        refs.push(target);
        return;
    }
    for sub in subschemas(schema) {
        collect_refs(sub.value, refs);
    }
}

fn owner_of<'a>(target: &str, owners: &[(&str, &'a str)]) -> Option<&'a str> {
    owners.iter().find_map(|&(pointer, name)| {
        let rest = target.strip_prefix(pointer)?;
        (rest.is_empty() || rest.starts_with('/')).then_some(name)
    })
}
