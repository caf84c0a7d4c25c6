use anyhow::{Context as AnyhowContext, Result};
use claude_tree_graph::{Thresholds, DEFAULT_GREEN_CEILING, DEFAULT_YELLOW_CEILING};
use claude_tree_indexer::ScanOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const CONFIG_FILE_NAME: &str = ".claude-tree.toml";
pub(crate) const TOKENIZER_ENV: &str = "CLAUDE_TREE_TOKENIZER";
pub(crate) const DEFAULT_DOC_BUDGET: usize = 1_500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ToolConfig {
    pub tokenizer: Option<PathBuf>,
    pub doc_budget: usize,
    pub thresholds: ThresholdsConfig,
    pub scan: ScanConfig,
    /// Directory the file was read from; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tokenizer: None,
            doc_budget: DEFAULT_DOC_BUDGET,
            thresholds: ThresholdsConfig::default(),
            scan: ScanConfig::default(),
            base_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ThresholdsConfig {
    pub green: usize,
    pub yellow: usize,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            green: DEFAULT_GREEN_CEILING,
            yellow: DEFAULT_YELLOW_CEILING,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScanConfig {
    pub extra_skip_dirs: Vec<String>,
    pub extra_skip_extensions: Vec<String>,
}

impl ToolConfig {
    /// Explicit `--config` must exist; the implicit file may be absent.
    pub(crate) fn load(explicit: Option<&Path>, fallback_dir: &Path) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (fallback_dir.join(CONFIG_FILE_NAME), false),
        };
        if !path.is_file() {
            if required {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: ToolConfig = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Flag, then `CLAUDE_TREE_TOKENIZER`, then the config file.
    pub(crate) fn tokenizer_path(&self, flag: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = flag {
            return Some(path.to_path_buf());
        }
        if let Some(value) = std::env::var_os(TOKENIZER_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(value));
        }
        self.tokenizer.as_ref().map(|path| match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.clone(),
        })
    }

    pub(crate) fn thresholds(&self, green: Option<usize>, yellow: Option<usize>) -> Thresholds {
        Thresholds::new(
            green.unwrap_or(self.thresholds.green),
            yellow.unwrap_or(self.thresholds.yellow),
        )
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_extra_skip_dirs(self.scan.extra_skip_dirs.iter().map(String::as_str))
            .with_extra_skip_extensions(self.scan.extra_skip_extensions.iter().map(String::as_str))
    }
}
