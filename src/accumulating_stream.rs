//! Accumulates streamed chunks into the complete reply while passing them through.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::oneshot;

use crate::collaborator::ChunkStream;
use crate::{Error, StreamChunk};

/// A stream wrapper that accumulates [`StreamChunk`]s into the complete reply text.
///
/// This allows chunks to be revealed to the user while the collaborator builds
/// the text it records in its transcript, without buffering. When the stream is
/// fully drained the accumulated text is sent via the oneshot channel returned
/// by `new()`. If the stream yields an error the sender is dropped instead, so
/// a failed reply is never recorded.
pub struct AccumulatingStream {
    inner: ChunkStream,
    text_tx: Option<oneshot::Sender<String>>,
    text: String,
}

impl AccumulatingStream {
    /// Wraps a chunk stream to accumulate its text.
    ///
    /// Returns the stream and a receiver that will contain the reply text once
    /// the stream is fully drained.
    pub fn new<S>(stream: S) -> (Self, oneshot::Receiver<String>)
    where
        S: Stream<Item = Result<StreamChunk, Error>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let this = Self {
            inner: Box::pin(stream),
            text_tx: Some(tx),
            text: String::new(),
        };
        (this, rx)
    }

    /// The text accumulated so far.
    pub fn partial(&self) -> &str {
        &self.text
    }
}

impl Stream for AccumulatingStream {
    type Item = Result<StreamChunk, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.text.push_str(&chunk.text);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                self.text_tx.take();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if let Some(tx) = self.text_tx.take() {
                    let text = std::mem::take(&mut self.text);
                    let _ = tx.send(text);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
