use crate::error::{IndexerError, Result};
use crate::stats::ScanStats;
use crate::tokenizer::TokenCounter;
use claude_tree_protocol::{is_agent_doc_name, Node, ROOT_PATH};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Hidden directory that is not skipped for being hidden.
pub const RESERVED_HIDDEN_DIR: &str = ".claude";

/// Exclusion lists applied while walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    skip_dirs: BTreeSet<String>,
    skip_extensions: BTreeSet<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            skip_dirs: SKIP_DIRS.iter().map(|s| (*s).to_string()).collect(),
            skip_extensions: SKIP_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl ScanOptions {
    pub fn with_extra_skip_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_dirs.extend(
            dirs.into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.trim().is_empty()),
        );
        self
    }

    /// Extensions are matched case-insensitively; a missing leading dot is added.
    pub fn with_extra_skip_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for ext in extensions {
            let ext = ext.into().trim().to_lowercase();
            if ext.is_empty() || ext == "." {
                continue;
            }
            if ext.starts_with('.') {
                self.skip_extensions.insert(ext);
            } else {
                self.skip_extensions.insert(format!(".{ext}"));
            }
        }
        self
    }

    pub fn skips_dir(&self, name: &str) -> bool {
        if self.skip_dirs.contains(name) {
            return true;
        }
        name.starts_with('.') && name != RESERVED_HIDDEN_DIR
    }

    pub fn skips_file(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        Path::new(&lowered)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.skip_extensions.contains(&format!(".{ext}")))
    }
}

/// Walks a directory and produces the annotated node tree.
pub struct TreeBuilder<'a> {
    root: PathBuf,
    counter: &'a dyn TokenCounter,
    options: ScanOptions,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(root: impl AsRef<Path>, counter: &'a dyn TokenCounter) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            counter,
            options: ScanOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(&self) -> Result<Node> {
        self.build_with_stats().map(|(tree, _)| tree)
    }

    /// Depth-first walk with sorted listings. Symlinks are followed.
    ///
    /// Unreadable entries (including dangling links and link loops) are logged
    /// and skipped; a directory whose listing fails keeps no children and is
    /// dropped like any other empty directory.
    pub fn build_with_stats(&self) -> Result<(Node, ScanStats)> {
        if !self.root.exists() {
            return Err(IndexerError::MissingPath(self.root.display().to_string()));
        }
        if !self.root.is_dir() {
            return Err(IndexerError::NotADirectory(self.root.display().to_string()));
        }

        let root_name = self
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());

        let mut stats = ScanStats::default();
        // stack[d] is the open directory at depth d
        let mut stack = vec![Node::directory(root_name, ROOT_PATH)];

        let options = &self.options;
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !options.skips_dir(&entry.file_name().to_string_lossy())
            });

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| self.root.display().to_string());
                    log::warn!("Could not read {path}: {err}");
                    stats.add_unreadable();
                    continue;
                }
            };

            let depth = entry.depth();
            if depth == 0 {
                continue;
            }
            close_dirs(&mut stack, depth);

            let name = entry.file_name().to_string_lossy().into_owned();
            let rel_path = self.relative_path(entry.path());
            let file_type = entry.file_type();

            if file_type.is_dir() {
                stats.add_directory();
                stack.push(Node::directory(name, rel_path));
            } else if file_type.is_file() {
                if self.options.skips_file(&name) {
                    log::trace!("Skipping excluded file {rel_path}");
                    continue;
                }
                let node = if is_agent_doc_name(&name) {
                    let tokens = self.count_doc_tokens(entry.path());
                    stats.add_agent_doc(tokens);
                    Node::agent_doc(name, rel_path, tokens)
                } else {
                    stats.add_file();
                    Node::file(name, rel_path)
                };
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            } else {
                log::debug!("Skipping non-regular entry {rel_path}");
            }
        }

        close_dirs(&mut stack, 1);
        let tree = stack
            .pop()
            .ok_or_else(|| IndexerError::MissingPath(self.root.display().to_string()))?;

        log::info!(
            "Scanned {} files ({} agent docs, {} tokens) in {} directories",
            stats.files + stats.agent_docs,
            stats.agent_docs,
            stats.agent_doc_tokens,
            stats.directories
        );
        if stats.unreadable > 0 {
            log::warn!("{} entries could not be read", stats.unreadable);
        }
        Ok((tree, stats))
    }

    fn count_doc_tokens(&self, path: &Path) -> usize {
        match fs::read_to_string(path) {
            Ok(content) => self.counter.count_tokens(&content),
            Err(e) => {
                log::warn!("Could not read {}: {e}", path.display());
                0
            }
        }
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if joined.is_empty() {
            ROOT_PATH.to_string()
        } else {
            joined
        }
    }
}

/// Pop directories until `depth` remain open, attaching non-empty ones to their parent.
fn close_dirs(stack: &mut Vec<Node>, depth: usize) {
    while stack.len() > depth {
        let Some(dir) = stack.pop() else {
            return;
        };
        if dir.children.is_empty() {
            log::trace!("Dropping empty directory {}", dir.path);
            continue;
        }
        if let Some(parent) = stack.last_mut() {
            parent.children.push(dir);
        }
    }
}

const SKIP_DIRS: &[&str] = &[
    // VCS / tooling
    ".git",
    ".idea",
    ".vscode",
    ".claude",
    "claude-tree",
    // caches / builds
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    "dist",
    "build",
    ".next",
    ".nuxt",
    ".cache",
    "coverage",
    ".nyc_output",
    "target",
];

const SKIP_EXTENSIONS: &[&str] = &[
    // images / fonts
    ".png", ".jpg", ".jpeg", ".gif", ".ico", ".svg", ".woff", ".woff2", ".ttf", ".eot",
    // archives / documents
    ".pdf", ".zip", ".tar", ".gz", ".rar",
    // binaries
    ".exe", ".dll", ".so", ".dylib", ".pyc", ".pyo", ".class",
    // databases / lock files
    ".db", ".sqlite", ".sqlite3", ".lock", ".sum",
];
