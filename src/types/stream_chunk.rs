use serde::{Deserialize, Serialize};

/// One incremental fragment of a streamed response.
///
/// `index` is the arrival order assigned by the collaborator; chunks are
/// consumed in that order and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Zero-based arrival position within the response.
    pub index: usize,
    /// The raw text of the fragment.
    pub text: String,
}

impl StreamChunk {
    /// Create a new chunk.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Number of characters the renderer will reveal for this chunk.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
