use crate::error::{GraphError, Result};
use crate::validate::validate_edge_file;
use claude_tree_protocol::MergedGraph;
use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const EDGE_FILE_PATTERN: &str = "*.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Keep per-file error lists in the summary.
    pub detailed: bool,
}

/// Aggregate outcome of one merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub files_processed: usize,
    pub files_valid: usize,
    pub files_invalid: usize,
    pub total_edges: usize,
    /// Invalid file name -> its errors. Populated only in detailed mode.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validation_errors: BTreeMap<String, Vec<String>>,
}

impl MergeSummary {
    /// `true` when at least one input file was rejected.
    pub fn has_failures(&self) -> bool {
        self.files_invalid > 0
    }
}

/// Merges a directory of edge record files into one edge list.
///
/// Best effort: invalid files contribute nothing and are counted, valid
/// files are concatenated in file-name order without de-duplication.
pub struct EdgeMerger {
    options: MergeOptions,
    matcher: GlobMatcher,
}

impl EdgeMerger {
    pub fn new(options: MergeOptions) -> Result<Self> {
        let matcher = GlobBuilder::new(EDGE_FILE_PATTERN)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(Self { options, matcher })
    }

    pub fn merge_dir(&self, dir: &Path) -> Result<(MergedGraph, MergeSummary)> {
        if !dir.is_dir() {
            return Err(GraphError::MissingInputDir(dir.display().to_string()));
        }
        let files = self.edge_files(dir)?;
        Ok(self.merge_files(&files))
    }

    /// Merge an explicit file list; the list is processed sorted by file name.
    pub fn merge_files(&self, files: &[PathBuf]) -> (MergedGraph, MergeSummary) {
        let mut files: Vec<&PathBuf> = files.iter().collect();
        files.sort_by_key(|path| file_label(path));

        let mut merged = MergedGraph::default();
        let mut summary = MergeSummary::default();

        for path in files {
            let name = file_label(path);
            summary.files_processed += 1;
            log::debug!("Processing: {name}");

            match validate_edge_file(path) {
                Ok(record) => {
                    summary.files_valid += 1;
                    summary.total_edges += record.edges.len();
                    log::debug!("  -> OK ({} edges)", record.edges.len());
                    merged.edges.extend(record.edges);
                }
                Err(errors) => {
                    summary.files_invalid += 1;
                    log::debug!("  -> INVALID ({} errors)", errors.len());
                    if self.options.detailed {
                        summary.validation_errors.insert(name, errors);
                    }
                }
            }
        }

        (merged, summary)
    }

    fn edge_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry in {}: {e}", dir.display());
                    continue;
                }
            };
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir || !self.matcher.is_match(entry.file_name()) {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        Ok(files)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
