//! # Claude Tree Indexer
//!
//! Inventory of agent instruction documents in a project.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> Tree Builder (sorted walk, exclusion lists)
//!     │      └─> Node tree, agent docs annotated with token counts
//!     │
//!     ├──> Tree Filter (optional)
//!     │      └─> Agent docs, their ancestors and sibling files
//!     │
//!     └──> Tree artifact
//!            └─> tree + flat agent doc list + totals
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use claude_tree_indexer::{inventory, Cl100kTokenCounter, ScanOptions};
//!
//! fn main() -> claude_tree_indexer::Result<()> {
//!     let counter = Cl100kTokenCounter::new()?;
//!     let artifact = inventory("/path/to/project", &counter, ScanOptions::default(), false)?;
//!     println!("{} agent docs, {} tokens", artifact.total_agent_docs, artifact.total_tokens);
//!     Ok(())
//! }
//! ```

mod error;
mod filter;
mod scanner;
mod stats;
mod tokenizer;

pub use error::{IndexerError, Result};
pub use filter::{collect_agent_docs, filter_to_agent_docs};
pub use scanner::{ScanOptions, TreeBuilder, RESERVED_HIDDEN_DIR};
pub use stats::ScanStats;
pub use tokenizer::{
    load_token_counter, Cl100kTokenCounter, HeuristicTokenCounter, HfTokenCounter, TokenCounter,
};

use claude_tree_protocol::TreeArtifact;
use std::path::Path;

/// Walk `root`, optionally prune to agent docs, and assemble the tree artifact.
pub fn inventory(
    root: impl AsRef<Path>,
    counter: &dyn TokenCounter,
    options: ScanOptions,
    full_tree: bool,
) -> Result<TreeArtifact> {
    let root = root.as_ref();
    let tree = TreeBuilder::new(root, counter).with_options(options).build()?;
    let tree = if full_tree {
        tree
    } else {
        filter_to_agent_docs(&tree)
    };
    let agent_docs = collect_agent_docs(&tree);
    Ok(TreeArtifact::new(root.display().to_string(), tree, agent_docs))
}
