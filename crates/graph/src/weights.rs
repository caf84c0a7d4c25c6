use claude_tree_protocol::paths::{dir_prefixes, join_rel, normalize_rel_path, parent_dir};
use claude_tree_protocol::{
    AgentDocEntry, DocFamily, DocTypeFilter, PathWeightsArtifact, PathWeightsMetadata, RankedPath,
    TreeArtifact, ROOT_PATH,
};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

/// Agent doc path -> token count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentDocIndex {
    tokens: BTreeMap<String, usize>,
}

impl AgentDocIndex {
    pub fn from_entries(entries: &[AgentDocEntry]) -> Self {
        let tokens = entries
            .iter()
            .map(|doc| (normalize_rel_path(&doc.path), doc.tokens))
            .collect();
        Self { tokens }
    }

    pub fn from_artifact(artifact: &TreeArtifact) -> Self {
        Self::from_entries(&artifact.agent_docs)
    }

    /// Accepts both `./CLAUDE.md` and `CLAUDE.md` spellings.
    pub fn get(&self, path: &str) -> Option<usize> {
        self.tokens.get(&normalize_rel_path(path)).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Docs passing `filter`, in path order.
    pub fn docs(&self, filter: DocTypeFilter) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.tokens
            .iter()
            .filter(move |(path, _)| filter.accepts(path))
            .map(|(path, tokens)| (path.as_str(), *tokens))
    }

    pub fn total_tokens(&self, filter: DocTypeFilter) -> usize {
        self.docs(filter).map(|(_, tokens)| tokens).sum()
    }

    /// Non-root directories on the ancestor chain of at least one doc.
    pub fn candidate_dirs(&self) -> BTreeSet<String> {
        self.tokens
            .keys()
            .flat_map(|doc| dir_prefixes(parent_dir(doc)))
            .collect()
    }

    /// The doc of `family` directly inside `dir`, canonical spelling first.
    fn doc_in(&self, dir: &str, family: DocFamily) -> Option<(String, usize)> {
        family.spellings().into_iter().find_map(|name| {
            let path = join_rel(dir, name);
            self.get(&path).map(|tokens| (path, tokens))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub file: String,
    pub tokens: usize,
}

/// Context an agent loads when working in one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeCost {
    pub total: usize,
    /// Root first, then shallow to deep; CLAUDE.md before AGENTS.md per directory.
    pub breakdown: Vec<BreakdownEntry>,
}

/// Sum the agent docs on the chain from the root down to `path`.
///
/// Computed from scratch on every call so that a changed filter or doc set
/// is always reflected.
pub fn cumulative_tokens(
    path: &str,
    filter: DocTypeFilter,
    index: &AgentDocIndex,
) -> CumulativeCost {
    let mut chain = vec![ROOT_PATH.to_string()];
    chain.extend(dir_prefixes(path));

    let mut cost = CumulativeCost::default();
    for dir in &chain {
        for family in DocFamily::ALL {
            let Some((file, tokens)) = index.doc_in(dir, family) else {
                continue;
            };
            if !filter.accepts(&file) {
                continue;
            }
            cost.total += tokens;
            cost.breakdown.push(BreakdownEntry { file, tokens });
        }
    }
    cost
}

/// Directories ranked by cumulative cost, heaviest first, ties by path.
pub fn rank(index: &AgentDocIndex, filter: DocTypeFilter) -> Vec<RankedPath> {
    let mut ranking: Vec<RankedPath> = index
        .candidate_dirs()
        .into_iter()
        .map(|path| {
            let cumulative_tokens = cumulative_tokens(&path, filter, index).total;
            RankedPath {
                path,
                cumulative_tokens,
            }
        })
        .filter(|entry| entry.cumulative_tokens > 0)
        .collect();
    ranking.sort_by(|a, b| {
        Reverse(a.cumulative_tokens)
            .cmp(&Reverse(b.cumulative_tokens))
            .then_with(|| a.path.cmp(&b.path))
    });
    ranking
}

/// Full path-weights artifact for one filter.
pub fn compute_path_weights(index: &AgentDocIndex, filter: DocTypeFilter) -> PathWeightsArtifact {
    let path_weights: BTreeMap<String, usize> = index
        .candidate_dirs()
        .into_iter()
        .map(|path| {
            let total = cumulative_tokens(&path, filter, index).total;
            (path, total)
        })
        .collect();
    let ranking = rank(index, filter);
    let max_path_weight = ranking
        .first()
        .map(|entry| entry.cumulative_tokens)
        .unwrap_or(0);

    PathWeightsArtifact {
        path_weights,
        ranking,
        metadata: PathWeightsMetadata {
            max_path_weight,
            doc_type_filter: filter,
        },
    }
}
