//! Logging hook for exchanges with the completion collaborators.
//!
//! This module provides the [`ExchangeLogger`] trait that lets a front-end
//! capture every chunk, recorded turn, and handled failure passing through the
//! flows, plus [`TracingLogger`], which forwards them to `tracing`.

use tracing::{debug, info, warn};

use crate::{Error, StreamChunk, Turn};

/// Which conversation an event belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Flow {
    /// The multi-turn text chat.
    Text,
    /// The single-image question flow.
    Image,
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flow::Text => write!(f, "text"),
            Flow::Image => write!(f, "image"),
        }
    }
}

/// A trait for logging exchanges with the completion collaborators.
///
/// # Example
///
/// ```rust,ignore
/// use mitra::{ExchangeLogger, Flow, StreamChunk, Turn, Error};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ExchangeLogger for FileLogger {
///     fn log_chunk(&self, flow: Flow, chunk: &StreamChunk) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{flow} chunk {}: {:?}", chunk.index, chunk.text).unwrap();
///     }
///
///     fn log_turn(&self, flow: Flow, turn: &Turn) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{flow} {}: {}", turn.role(), turn.text()).unwrap();
///     }
///
///     fn log_failure(&self, flow: Flow, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{flow} failed: {error}").unwrap();
///     }
/// }
/// ```
pub trait ExchangeLogger: Send + Sync {
    /// Log one chunk as it arrives, before it is revealed.
    fn log_chunk(&self, flow: Flow, chunk: &StreamChunk);

    /// Log a turn once it has been recorded in a history.
    fn log_turn(&self, flow: Flow, turn: &Turn);

    /// Log a failure that was converted into a terminal display state.
    fn log_failure(&self, flow: Flow, error: &Error);
}

/// An [`ExchangeLogger`] that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ExchangeLogger for TracingLogger {
    fn log_chunk(&self, flow: Flow, chunk: &StreamChunk) {
        debug!(%flow, index = chunk.index, chars = chunk.char_count(), "chunk received");
    }

    fn log_turn(&self, flow: Flow, turn: &Turn) {
        info!(%flow, role = %turn.role(), chars = turn.text().chars().count(), "turn recorded");
    }

    fn log_failure(&self, flow: Flow, error: &Error) {
        warn!(%flow, blocked = error.is_blocked(), %error, "exchange failed");
    }
}
