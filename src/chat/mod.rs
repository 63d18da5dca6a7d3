//! The two conversation flows and the session that owns them.
//!
//! - [`TextChat`]: multi-turn text chat against a [`ChatCollaborator`],
//!   whose transcript is the authoritative history.
//! - [`ImageChat`]: single-shot questions about one uploaded image against a
//!   [`VisionCollaborator`], with a history that lives as long as the image.
//! - [`Session`]: one user's pair of flows, driven by [`SessionEvent`]s.
//!
//! Every prompt goes through input gatekeeping before dispatch, and every
//! reply is revealed through the same paced renderer.
//!
//! [`ChatCollaborator`]: crate::collaborator::ChatCollaborator
//! [`VisionCollaborator`]: crate::collaborator::VisionCollaborator

mod config;
mod events;
mod session;
mod text;
mod vision;

pub use config::ChatConfig;
pub use events::SessionEvent;
pub use session::{Session, SessionStats};
pub use text::TextChat;
pub use vision::ImageChat;

use crate::reveal::RevealStatus;
use crate::types::Turn;

/// The result of submitting a prompt to either flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Nothing was dispatched and nothing changed.
    Ignored,
    /// Nothing was dispatched; this warning was shown instead.
    Warned(String),
    /// The prompt was dispatched and the reply revealed.
    Answered(TurnOutcome),
}

impl Submission {
    /// The outcome of an answered prompt.
    pub fn outcome(&self) -> Option<&TurnOutcome> {
        match self {
            Submission::Answered(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// How an answered prompt ended.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The reply turn as recorded in the history.
    pub reply: Turn,
    /// Whether the reply completed, was blocked, or failed.
    pub status: RevealStatus,
    /// Number of intermediate updates shown while revealing.
    pub updates: usize,
}
