//! The external completion collaborators.
//!
//! The provider integration lives outside this crate. A front-end plugs it in
//! by implementing [`ChatCollaborator`] for the stateful multi-turn text chat
//! and [`VisionCollaborator`] for single-shot image questions. Both return a
//! [`ChunkStream`]: an ordered, lazy, finite sequence of text fragments.

mod scripted;

use std::pin::Pin;

use futures::Stream;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::types::{ImageQuery, SafetySettings, StreamChunk, Turn};

pub use scripted::{ScriptedChat, ScriptedReply, ScriptedVision, VisionRequest};

/// A boxed stream of reply fragments in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// A stateful, multi-turn chat collaborator.
///
/// The collaborator owns the conversation context sent on every turn, and its
/// transcript is the authoritative text-flow history.
#[async_trait::async_trait]
pub trait ChatCollaborator: Send {
    /// Sends one prompt with the given safety configuration and returns the reply stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be dispatched, including a
    /// [`crate::Error::Blocked`] when the prompt itself is refused.
    async fn send_message(
        &mut self,
        prompt: &str,
        safety: &SafetySettings,
    ) -> Result<ChunkStream>;

    /// Returns the collaborator's transcript after the last exchange.
    fn transcript(&mut self) -> Vec<Turn>;

    /// Restarts the conversation from the given transcript.
    fn replace_transcript(&mut self, transcript: Vec<Turn>);
}

/// A stateless, single-shot vision collaborator.
#[async_trait::async_trait]
pub trait VisionCollaborator: Send + Sync {
    /// Asks one question about one image and returns the reply stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be dispatched.
    async fn generate_content(
        &self,
        prompt: &str,
        image: &ImageQuery,
        safety: &SafetySettings,
    ) -> Result<ChunkStream>;
}

#[async_trait::async_trait]
impl<T: ChatCollaborator + ?Sized> ChatCollaborator for Box<T> {
    async fn send_message(
        &mut self,
        prompt: &str,
        safety: &SafetySettings,
    ) -> Result<ChunkStream> {
        (**self).send_message(prompt, safety).await
    }

    fn transcript(&mut self) -> Vec<Turn> {
        (**self).transcript()
    }

    fn replace_transcript(&mut self, transcript: Vec<Turn>) {
        (**self).replace_transcript(transcript)
    }
}

#[async_trait::async_trait]
impl<T: VisionCollaborator + ?Sized> VisionCollaborator for Box<T> {
    async fn generate_content(
        &self,
        prompt: &str,
        image: &ImageQuery,
        safety: &SafetySettings,
    ) -> Result<ChunkStream> {
        (**self).generate_content(prompt, image, safety).await
    }
}

/// Builds a [`ChunkStream`] from fragments, numbering them in order.
pub fn chunk_stream<I>(fragments: I) -> ChunkStream
where
    I: IntoIterator<Item = Result<String>>,
    I::IntoIter: Send + 'static,
{
    Box::pin(
        stream::iter(fragments)
            .enumerate()
            .map(|(index, fragment)| fragment.map(|text| StreamChunk::new(index, text))),
    )
}

/// A stream that fails before yielding anything.
pub(crate) fn failed_stream(err: crate::Error) -> ChunkStream {
    Box::pin(stream::once(async move { Err(err) }))
}
