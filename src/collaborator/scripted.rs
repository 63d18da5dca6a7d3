//! In-memory collaborators that replay scripted replies.
//!
//! Useful offline and in tests: each call to the collaborator pops the next
//! [`ScriptedReply`] and turns it into a dispatch failure or a chunk stream.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::debug;

use crate::accumulating_stream::AccumulatingStream;
use crate::collaborator::{ChatCollaborator, ChunkStream, VisionCollaborator, chunk_stream};
use crate::error::{Error, Result};
use crate::types::{ImageMediaType, ImageQuery, SafetySettings, Turn};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Stream these fragments, then end normally.
    Chunks(Vec<String>),

    /// Stream these fragments, then fail with the error.
    FailAfter(Vec<String>, Error),

    /// Fail at dispatch, before any stream exists.
    Reject(Error),
}

impl ScriptedReply {
    /// A reply streaming the given fragments.
    pub fn chunks<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedReply::Chunks(fragments.into_iter().map(Into::into).collect())
    }

    /// A reply the collaborator refuses on policy grounds at dispatch.
    pub fn blocked(message: impl Into<String>) -> Self {
        ScriptedReply::Reject(Error::blocked(message, Some("SAFETY".to_string())))
    }

    fn into_stream(self) -> Result<ChunkStream> {
        match self {
            ScriptedReply::Chunks(fragments) => Ok(chunk_stream(
                fragments.into_iter().map(Ok).collect::<Vec<_>>(),
            )),
            ScriptedReply::FailAfter(fragments, err) => {
                let mut items: Vec<Result<String>> = fragments.into_iter().map(Ok).collect();
                items.push(Err(err));
                Ok(chunk_stream(items))
            }
            ScriptedReply::Reject(err) => Err(err),
        }
    }
}

struct PendingExchange {
    prompt: String,
    reply: oneshot::Receiver<String>,
}

/// A chat collaborator replaying scripted replies.
///
/// Like a hosted chat, the exchange enters the transcript only once its reply
/// stream was drained without error.
pub struct ScriptedChat {
    replies: VecDeque<ScriptedReply>,
    transcript: Vec<Turn>,
    pending: Option<PendingExchange>,
    prompts: Vec<String>,
    safety: Option<SafetySettings>,
}

impl ScriptedChat {
    /// Creates a chat that answers with `replies`, in order.
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = ScriptedReply>,
    {
        Self {
            replies: replies.into_iter().collect(),
            transcript: Vec::new(),
            pending: None,
            prompts: Vec::new(),
            safety: None,
        }
    }

    /// Queues another reply.
    pub fn push_reply(&mut self, reply: ScriptedReply) {
        self.replies.push_back(reply);
    }

    /// Every prompt dispatched so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// The safety configuration sent with the last prompt.
    pub fn last_safety(&self) -> Option<&SafetySettings> {
        self.safety.as_ref()
    }

    fn settle(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        match pending.reply.try_recv() {
            Ok(text) => {
                self.transcript.push(Turn::user(pending.prompt));
                self.transcript.push(Turn::model(text));
            }
            Err(TryRecvError::Empty) => self.pending = Some(pending),
            Err(TryRecvError::Closed) => {
                debug!(prompt = %pending.prompt, "scripted exchange failed; not recorded");
            }
        }
    }
}

#[async_trait::async_trait]
impl ChatCollaborator for ScriptedChat {
    async fn send_message(
        &mut self,
        prompt: &str,
        safety: &SafetySettings,
    ) -> Result<ChunkStream> {
        self.settle();
        self.prompts.push(prompt.to_string());
        self.safety = Some(safety.clone());
        let reply = self
            .replies
            .pop_front()
            .ok_or_else(|| Error::unknown("no scripted reply left"))?;
        let stream = reply.into_stream()?;
        let (stream, rx) = AccumulatingStream::new(stream);
        self.pending = Some(PendingExchange {
            prompt: prompt.to_string(),
            reply: rx,
        });
        Ok(Box::pin(stream))
    }

    fn transcript(&mut self) -> Vec<Turn> {
        self.settle();
        self.transcript.clone()
    }

    fn replace_transcript(&mut self, transcript: Vec<Turn>) {
        self.pending = None;
        self.transcript = transcript;
    }
}

/// What a [`ScriptedVision`] was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionRequest {
    /// The prompt.
    pub prompt: String,
    /// The media type of the attached image.
    pub media_type: ImageMediaType,
    /// Size of the attached payload in bytes.
    pub payload_len: usize,
}

/// A vision collaborator replaying scripted replies.
#[derive(Default)]
pub struct ScriptedVision {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<VisionRequest>>,
}

impl ScriptedVision {
    /// Creates a collaborator that answers with `replies`, in order.
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = ScriptedReply>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues another reply.
    pub fn push_reply(&self, reply: ScriptedReply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl VisionCollaborator for ScriptedVision {
    async fn generate_content(
        &self,
        prompt: &str,
        image: &ImageQuery,
        _safety: &SafetySettings,
    ) -> Result<ChunkStream> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(VisionRequest {
                prompt: prompt.to_string(),
                media_type: image.media_type(),
                payload_len: image.bytes().len(),
            });
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::unknown("no scripted reply left"))?;
        reply.into_stream()
    }
}
