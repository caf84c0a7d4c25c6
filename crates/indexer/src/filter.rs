use claude_tree_protocol::{AgentDocEntry, Node, NodeKind};
use std::collections::HashMap;

/// Prune a tree down to the parts relevant to agent docs.
///
/// Keeps every agent doc, every directory with an agent doc somewhere below
/// it, and every plain file whose parent directory has an agent doc anywhere
/// in its subtree. When nothing survives, the input tree is returned as is.
pub fn filter_to_agent_docs(tree: &Node) -> Node {
    let carriers = CarrierIndex::build(tree);
    prune(tree, false, &carriers).unwrap_or_else(|| tree.clone())
}

/// Flat list of agent docs in depth-first order.
pub fn collect_agent_docs(tree: &Node) -> Vec<AgentDocEntry> {
    tree.iter()
        .filter(|node| node.is_agent_doc)
        .map(|node| AgentDocEntry {
            path: node.path.clone(),
            tokens: node.tokens.unwrap_or(0),
        })
        .collect()
}

/// Memoized "subtree holds an agent doc" flag for every node, keyed by path.
struct CarrierIndex<'a> {
    carries: HashMap<&'a str, bool>,
}

impl<'a> CarrierIndex<'a> {
    fn build(tree: &'a Node) -> Self {
        let mut carries = HashMap::new();
        Self::fold(tree, &mut carries);
        Self { carries }
    }

    fn fold(node: &'a Node, carries: &mut HashMap<&'a str, bool>) -> bool {
        let mut found = node.is_agent_doc;
        for child in &node.children {
            // no short-circuit: every descendant needs its own entry
            found |= Self::fold(child, carries);
        }
        carries.insert(node.path.as_str(), found);
        found
    }

    fn carries(&self, node: &Node) -> bool {
        self.carries.get(node.path.as_str()).copied().unwrap_or(false)
    }
}

fn prune(node: &Node, include_files: bool, carriers: &CarrierIndex<'_>) -> Option<Node> {
    match node.kind {
        NodeKind::File => (node.is_agent_doc || include_files).then(|| node.clone()),
        NodeKind::Directory => {
            let carries = carriers.carries(node);
            let children: Vec<Node> = node
                .children
                .iter()
                .filter_map(|child| prune(child, carries, carriers))
                .collect();

            (!children.is_empty() || carries).then(|| Node {
                name: node.name.clone(),
                path: node.path.clone(),
                kind: node.kind,
                children,
                is_agent_doc: node.is_agent_doc,
                tokens: node.tokens,
            })
        }
    }
}
