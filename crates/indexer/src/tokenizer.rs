use crate::error::{IndexerError, Result};
use std::path::{Path, PathBuf};
use tiktoken_rs::CoreBPE;
use tokenizers::Tokenizer;

/// Turns document text into a token count.
///
/// Implementations must be deterministic and keep no state between calls.
pub trait TokenCounter {
    fn count_tokens(&self, text: &str) -> usize;
}

/// Character-based estimate (one token per four characters, rounded up).
///
/// Only used when a real tokenizer fails to encode a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// The `cl100k_base` byte-pair encoding, bundled with the binary.
pub struct Cl100kTokenCounter {
    bpe: CoreBPE,
}

impl Cl100kTokenCounter {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| IndexerError::TokenizerError(format!("cl100k_base: {e}")))?;
        Ok(Self { bpe })
    }
}

impl TokenCounter for Cl100kTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        // Special-token markers in a document are plain text, not control tokens.
        self.bpe.encode_ordinary(text).len()
    }
}

/// Token counter backed by a Hugging Face `tokenizer.json` (BPE or otherwise).
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
    source: PathBuf,
}

impl HfTokenCounter {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Documents are counted one at a time; keep the tokenizer single-threaded
        // unless the user configured otherwise.
        if !tokenizers::utils::parallelism::is_parallelism_configured() {
            tokenizers::utils::parallelism::set_parallelism(false);
        }

        if !path.is_file() {
            return Err(IndexerError::TokenizerError(format!(
                "tokenizer file {} does not exist",
                path.display()
            )));
        }

        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| IndexerError::TokenizerError(format!("{}: {e}", path.display())))?;
        log::debug!("Loaded tokenizer from {}", path.display());

        Ok(Self {
            tokenizer,
            source: path.to_path_buf(),
        })
    }

}

impl TokenCounter for HfTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.get_ids().len(),
            Err(e) => {
                log::warn!(
                    "Tokenizer {} failed to encode text, falling back to estimate: {e}",
                    self.source.display()
                );
                HeuristicTokenCounter.count_tokens(text)
            }
        }
    }
}

/// Tokenizer file if one is configured, `cl100k_base` otherwise.
pub fn load_token_counter(tokenizer_path: Option<&Path>) -> Result<Box<dyn TokenCounter>> {
    match tokenizer_path {
        Some(path) => Ok(Box::new(HfTokenCounter::from_file(path)?)),
        None => {
            log::debug!("No tokenizer configured, using cl100k_base");
            Ok(Box::new(Cl100kTokenCounter::new()?))
        }
    }
}
