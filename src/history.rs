//! Session history stores.
//!
//! The text flow and the image flow never share context, so each owns its own
//! store with its own lifecycle. Both are append-only and strictly
//! chronological; [`History::clear`] is the only bulk mutation.

use crate::types::{DisplayEntry, Role, Turn};

/// An append-only, chronologically ordered conversation history.
pub trait History {
    /// Adds one turn to the end of the history.
    fn append(&mut self, role: Role, text: &str);

    /// Replaces the whole history with an empty sequence.
    fn clear(&mut self);

    /// The stored turns, oldest first.
    fn turns(&self) -> &[Turn];

    /// One display entry per stored turn, in order, with roles translated.
    fn render_all(&self) -> Vec<DisplayEntry> {
        self.turns().iter().map(DisplayEntry::from).collect()
    }

    /// Number of stored turns.
    fn len(&self) -> usize {
        self.turns().len()
    }

    /// True when nothing has been stored.
    fn is_empty(&self) -> bool {
        self.turns().is_empty()
    }
}

/// The text-flow history.
///
/// The chat collaborator's transcript is authoritative: after every exchange
/// the flow hands the reported transcript to [`TextHistory::replace_with`], so
/// what is displayed and what is sent as context on the next turn never
/// diverge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextHistory {
    turns: Vec<Turn>,
}

impl TextHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the history with the collaborator's transcript.
    pub fn replace_with(&mut self, transcript: Vec<Turn>) {
        self.turns = transcript;
    }
}

impl History for TextHistory {
    fn append(&mut self, role: Role, text: &str) {
        self.turns.push(Turn::new(role, text));
    }

    fn clear(&mut self) {
        self.turns = Vec::new();
    }

    fn turns(&self) -> &[Turn] {
        &self.turns
    }
}

/// The image-flow history.
///
/// The vision collaborator is single-shot, so this store is the sole source
/// of truth. It lives exactly as long as the image it is about.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageHistory {
    turns: Vec<Turn>,
}

impl ImageHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }
}

impl History for ImageHistory {
    fn append(&mut self, role: Role, text: &str) {
        self.turns.push(Turn::new(role, text));
    }

    fn clear(&mut self) {
        self.turns = Vec::new();
    }

    fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
