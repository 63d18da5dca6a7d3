//! Paced streaming reveal and session history for chat front-ends.
//!
//! mitra sits between a user-facing front-end and an external generative
//! model. It offers a multi-turn text chat and a single-image question flow,
//! reveals every streamed reply at a steady typing cadence, and keeps one
//! history per flow.

// Public modules
pub mod accumulating_stream;
pub mod chat;
pub mod client_logger;
pub mod collaborator;
pub mod error;
pub mod history;
pub mod input;
pub mod render;
pub mod reveal;
pub mod types;

mod observability;

// Re-exports
pub use accumulating_stream::AccumulatingStream;
pub use chat::{
    ChatConfig, ImageChat, Session, SessionEvent, SessionStats, Submission, TextChat, TurnOutcome,
};
pub use client_logger::{ExchangeLogger, Flow, TracingLogger};
pub use collaborator::{
    ChatCollaborator, ChunkStream, ScriptedChat, ScriptedReply, ScriptedVision, VisionCollaborator,
    VisionRequest, chunk_stream,
};
pub use error::{Error, Result};
pub use history::{History, ImageHistory, TextHistory};
pub use input::{Gate, admit_image, admit_text, normalize_prompt};
pub use observability::register_biometrics;
pub use render::{DisplaySlot, RecordingSlot, TerminalSlot};
pub use reveal::{Cadence, ErrorMessages, Reveal, RevealRenderer, RevealStatus};
pub use types::*;
