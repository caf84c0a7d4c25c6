use claude_tree_protocol::paths::normalize_rel_path;
use claude_tree_protocol::{EdgeType, MergedGraph};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Read-only view of merged edges, addressed by path.
///
/// Edges name their endpoints by path string. A target missing from the
/// known path set is a dangling reference: it is kept and reported, not
/// treated as an error.
pub struct ReferenceGraph {
    graph: DiGraph<String, EdgeType>,
    index: HashMap<String, NodeIndex>,
    known: HashSet<String>,
}

impl ReferenceGraph {
    pub fn build<'a>(merged: &MergedGraph, known_paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            known: known_paths.into_iter().map(normalize_rel_path).collect(),
        };
        for edge in &merged.edges {
            let from = graph.intern(&edge.source);
            let to = graph.intern(&edge.target);
            graph.graph.add_edge(from, to, edge.kind);
        }
        log::debug!(
            "Reference graph: {} paths, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    fn intern(&mut self, path: &str) -> NodeIndex {
        let path = normalize_rel_path(path);
        if let Some(idx) = self.index.get(&path) {
            return *idx;
        }
        let idx = self.graph.add_node(path.clone());
        self.index.insert(path, idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Targets referenced by `source`, in merge order, repeats included.
    pub fn references_from(&self, source: &str) -> Vec<(&str, EdgeType)> {
        let Some(&idx) = self.index.get(&normalize_rel_path(source)) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges(idx).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| (self.graph[edge.target()].as_str(), *edge.weight()))
            .collect()
    }

    /// Number of edges pointing at `path`.
    pub fn inbound_count(&self, path: &str) -> usize {
        self.index
            .get(&normalize_rel_path(path))
            .map(|&idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    /// Paths with at least one outgoing edge, sorted.
    pub fn sources(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Outgoing)
                    .next()
                    .is_some()
            })
            .map(|idx| self.graph[idx].as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Referenced paths absent from the known path set, sorted and unique.
    pub fn dangling_targets(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_some()
            })
            .map(|idx| self.graph[idx].as_str())
            .filter(|path| !self.known.contains(*path))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_tree_protocol::Edge;
    use pretty_assertions::assert_eq;

    fn edge(source: &str, target: &str, kind: EdgeType) -> Edge {
        Edge::new(source, target, kind)
    }

    fn sample() -> MergedGraph {
        MergedGraph {
            edges: vec![
                edge("CLAUDE.md", "docs/AGENTS.md", EdgeType::AgentDoc),
                edge("CLAUDE.md", "src", EdgeType::Directory),
                edge("docs/AGENTS.md", "docs/guide.md", EdgeType::File),
                edge("./CLAUDE.md", "src", EdgeType::Directory),
                edge("docs/AGENTS.md", "gone/file.rs", EdgeType::File),
            ],
        }
    }

    #[test]
    fn references_keep_merge_order_and_repeats() {
        let graph = ReferenceGraph::build(&sample(), ["CLAUDE.md", "docs/AGENTS.md", "src"]);

        assert_eq!(
            graph.references_from("CLAUDE.md"),
            vec![
                ("docs/AGENTS.md", EdgeType::AgentDoc),
                ("src", EdgeType::Directory),
                ("src", EdgeType::Directory),
            ]
        );
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.inbound_count("src"), 2);
        assert_eq!(graph.inbound_count("unknown"), 0);
    }

    #[test]
    fn dangling_targets_are_reported_not_rejected() {
        let known = [".", "CLAUDE.md", "docs", "docs/AGENTS.md", "docs/guide.md", "src"];
        let graph = ReferenceGraph::build(&sample(), known);

        assert_eq!(graph.dangling_targets(), vec!["gone/file.rs"]);
        assert_eq!(graph.sources(), vec!["CLAUDE.md", "docs/AGENTS.md"]);
    }

    #[test]
    fn unknown_source_has_no_references() {
        let graph = ReferenceGraph::build(&MergedGraph::default(), std::iter::empty());
        assert!(graph.references_from("CLAUDE.md").is_empty());
        assert!(graph.dangling_targets().is_empty());
    }
}
