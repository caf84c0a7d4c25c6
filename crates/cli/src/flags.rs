use clap::ValueEnum;
use claude_tree_protocol::{
    DocTypeFilter, EdgeRecord, MergedGraph, PathWeightsArtifact, TreeArtifact,
};
use schemars::{schema_for, Schema};

#[derive(Copy, Clone, Default, ValueEnum)]
pub(crate) enum DocTypeFlag {
    #[default]
    All,
    Claude,
    Agents,
}

impl DocTypeFlag {
    pub(crate) const fn as_domain(self) -> DocTypeFilter {
        match self {
            DocTypeFlag::All => DocTypeFilter::All,
            DocTypeFlag::Claude => DocTypeFilter::Claude,
            DocTypeFlag::Agents => DocTypeFilter::Agents,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum SchemaKind {
    Tree,
    EdgeRecord,
    MergedEdges,
    PathWeights,
}

impl SchemaKind {
    pub(crate) fn schema(self) -> Schema {
        match self {
            SchemaKind::Tree => schema_for!(TreeArtifact),
            SchemaKind::EdgeRecord => schema_for!(EdgeRecord),
            SchemaKind::MergedEdges => schema_for!(MergedGraph),
            SchemaKind::PathWeights => schema_for!(PathWeightsArtifact),
        }
    }
}
