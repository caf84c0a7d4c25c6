//! # Claude Tree Graph
//!
//! Everything computed on top of the agent doc inventory.
//!
//! ## Features
//!
//! - **Edge merging** - validate and merge per-producer edge record files
//! - **Path weights** - cumulative context cost of every directory, ranked
//! - **Cost bands** - healthy / warning / critical classification
//! - **Reference graph** - what each doc points at, and which targets dangle
//!
//! ## Architecture
//!
//! ```text
//! edges/*.json
//!     │
//!     └──> Edge Merger (sorted, per-file validation)
//!            ├─ Valid records: edges appended in file order
//!            └─ Invalid records: zero edges, errors in summary
//!
//! TreeArtifact.agentDocs
//!     │
//!     └──> Path-Weight Aggregator
//!            ├─ cumulative_tokens(path, filter)
//!            ├─ rank(filter)
//!            └─ classify(tokens, thresholds)
//! ```

mod bands;
mod error;
mod merge;
mod references;
mod validate;
mod weights;

pub use bands::{
    classify, CostBand, Thresholds, AUTO_HEAL_GAP, DEFAULT_GREEN_CEILING, DEFAULT_YELLOW_CEILING,
};
pub use error::{GraphError, Result};
pub use merge::{EdgeMerger, MergeOptions, MergeSummary, EDGE_FILE_PATTERN};
pub use references::ReferenceGraph;
pub use validate::{validate_edge_file, validate_edge_record};
pub use weights::{
    compute_path_weights, cumulative_tokens, rank, AgentDocIndex, BreakdownEntry, CumulativeCost,
};
