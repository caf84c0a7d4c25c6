use schemars::JsonSchema;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub mod paths;

pub use paths::ROOT_PATH;

/// File names recognized as agent instruction documents.
///
/// Canonical upper-case spellings plus their lower-case variants; matching is
/// exact against this set.
pub const AGENT_DOC_NAMES: &[&str] = &["CLAUDE.md", "AGENTS.md", "claude.md", "agents.md"];

pub fn is_agent_doc_name(name: &str) -> bool {
    AGENT_DOC_NAMES.contains(&name)
}

/// Document family of an agent doc.
///
/// The declaration order is the canonical order used whenever one directory
/// holds docs of both families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocFamily {
    Claude,
    Agents,
}

impl DocFamily {
    pub const ALL: [DocFamily; 2] = [DocFamily::Claude, DocFamily::Agents];

    pub const fn canonical_name(self) -> &'static str {
        match self {
            DocFamily::Claude => "CLAUDE.md",
            DocFamily::Agents => "AGENTS.md",
        }
    }

    pub const fn lowercase_name(self) -> &'static str {
        match self {
            DocFamily::Claude => "claude.md",
            DocFamily::Agents => "agents.md",
        }
    }

    /// Spellings looked up per directory, canonical first.
    pub const fn spellings(self) -> [&'static str; 2] {
        [self.canonical_name(), self.lowercase_name()]
    }

    /// Family of a file name or path, matched case-insensitively on the base name.
    pub fn of(path: &str) -> Option<Self> {
        let name = paths::file_name(path).to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| family.lowercase_name() == name)
    }
}

/// Which document families participate in cumulative cost aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocTypeFilter {
    #[default]
    All,
    Claude,
    Agents,
}

impl DocTypeFilter {
    pub fn accepts(self, path: &str) -> bool {
        match self {
            DocTypeFilter::All => true,
            DocTypeFilter::Claude => DocFamily::of(path) == Some(DocFamily::Claude),
            DocTypeFilter::Agents => DocFamily::of(path) == Some(DocFamily::Agents),
        }
    }

    /// Label used in human-readable output.
    pub const fn label(self) -> &'static str {
        match self {
            DocTypeFilter::All => "all agent docs",
            DocTypeFilter::Claude => "CLAUDE.md",
            DocTypeFilter::Agents => "AGENTS.md",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One entry of the inventoried directory tree.
///
/// Directories always serialize `children`, even when empty; files never do.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    /// Root-relative path, `"."` for the root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Sorted by name. Always empty for files.
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_agent_doc: bool,
    /// Present iff `is_agent_doc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<usize>,
}

impl Node {
    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            is_agent_doc: false,
            tokens: None,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            is_agent_doc: false,
            tokens: None,
        }
    }

    pub fn agent_doc(name: impl Into<String>, path: impl Into<String>, tokens: usize) -> Self {
        Self {
            is_agent_doc: true,
            tokens: Some(tokens),
            ..Self::file(name, path)
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Depth-first, pre-order traversal including `self`.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = 3
            + usize::from(self.is_directory())
            + usize::from(self.is_agent_doc)
            + usize::from(self.tokens.is_some());
        let mut state = serializer.serialize_struct("Node", fields)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("type", &self.kind)?;
        if self.is_directory() {
            state.serialize_field("children", &self.children)?;
        } else {
            state.skip_field("children")?;
        }
        if self.is_agent_doc {
            state.serialize_field("isAgentDoc", &self.is_agent_doc)?;
        } else {
            state.skip_field("isAgentDoc")?;
        }
        match &self.tokens {
            Some(tokens) => state.serialize_field("tokens", tokens)?,
            None => state.skip_field("tokens")?,
        }
        state.end()
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AgentDocEntry {
    pub path: String,
    pub tokens: usize,
}

/// Output of the `tree` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeArtifact {
    /// Absolute path of the scanned root.
    pub root: String,
    pub tree: Node,
    pub agent_docs: Vec<AgentDocEntry>,
    pub total_agent_docs: usize,
    pub total_tokens: usize,
}

impl TreeArtifact {
    pub fn new(root: impl Into<String>, tree: Node, agent_docs: Vec<AgentDocEntry>) -> Self {
        let total_tokens = agent_docs.iter().map(|doc| doc.tokens).sum();
        Self {
            root: root.into(),
            total_agent_docs: agent_docs.len(),
            total_tokens,
            agent_docs,
            tree,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    AgentDoc,
    File,
    Directory,
}

impl EdgeType {
    pub const ALL: [EdgeType; 3] = [EdgeType::AgentDoc, EdgeType::File, EdgeType::Directory];

    pub const fn as_str(self) -> &'static str {
        match self {
            EdgeType::AgentDoc => "agent-doc",
            EdgeType::File => "file",
            EdgeType::Directory => "directory",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

/// Directed reference from an agent doc to a path.
///
/// Paths are plain strings; the target need not exist in any tree. Fields a
/// producer adds beyond the three required ones are carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            extra: Map::new(),
        }
    }
}

/// One producer's report: the edges found in a single agent doc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EdgeRecord {
    pub source: String,
    pub edges: Vec<Edge>,
}

/// Merged edge list; repeated edges are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MergedGraph {
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedPath {
    pub path: String,
    pub cumulative_tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathWeightsMetadata {
    pub max_path_weight: usize,
    #[serde(default)]
    pub doc_type_filter: DocTypeFilter,
}

/// Output of the `weights` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathWeightsArtifact {
    pub path_weights: BTreeMap<String, usize>,
    pub ranking: Vec<RankedPath>,
    pub metadata: PathWeightsMetadata,
}
