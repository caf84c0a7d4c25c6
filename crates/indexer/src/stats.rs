use serde::{Deserialize, Serialize};

/// Counters collected during one tree walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Directories entered (before empty-directory pruning)
    pub directories: usize,

    /// Regular files kept, agent docs excluded
    pub files: usize,

    pub agent_docs: usize,

    pub agent_doc_tokens: usize,

    /// Entries that could not be listed or inspected
    pub unreadable: usize,
}

impl ScanStats {
    pub fn add_directory(&mut self) {
        self.directories += 1;
    }

    pub fn add_file(&mut self) {
        self.files += 1;
    }

    pub fn add_agent_doc(&mut self, tokens: usize) {
        self.agent_docs += 1;
        self.agent_doc_tokens += tokens;
    }

    pub fn add_unreadable(&mut self) {
        self.unreadable += 1;
    }
}
