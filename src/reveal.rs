//! Paced reveal of streamed replies.
//!
//! The [`RevealRenderer`] turns a stream of arbitrarily sized chunks into a
//! steady typing cadence. For every chunk it samples a batch size from
//! `[min_batch, max_batch]`; each time that many characters have been
//! appended it pauses briefly and redraws the slot with the accumulated text
//! and a cursor marker, then samples the next batch size. Once the stream
//! ends the accumulated text is drawn once more without the cursor.
//!
//! Failures never escape the renderer. A blocked or broken stream ends the
//! reveal with a user-visible message in place of, or after, the partial
//! text, and [`Reveal::status`] tells the caller what happened.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{Stream, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client_logger::{ExchangeLogger, Flow};
use crate::error::{Error, Result};
use crate::observability::{
    REVEAL_BLOCKED, REVEAL_CHARS, REVEAL_CHUNKS, REVEAL_DURATION, REVEAL_FAILURES, REVEAL_UPDATES,
};
use crate::render::DisplaySlot;
use crate::types::StreamChunk;

/// Smallest batch size sampled by default.
pub const DEFAULT_MIN_BATCH: usize = 5;

/// Largest batch size sampled by default.
pub const DEFAULT_MAX_BATCH: usize = 10;

/// Default pause before each intermediate update, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 50;

/// Default cursor marker appended to intermediate updates.
pub const DEFAULT_CURSOR: &str = "_";

/// The pacing of intermediate updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cadence {
    /// Smallest number of characters between updates.
    pub min_batch: usize,
    /// Largest number of characters between updates.
    pub max_batch: usize,
    /// Pause before each intermediate update, in milliseconds.
    pub delay_ms: u64,
    /// Marker appended to intermediate updates.
    pub cursor: String,
}

impl Cadence {
    /// The pause before each intermediate update.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Sets the pause before each intermediate update.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the inclusive batch size range.
    pub fn with_batch(mut self, min_batch: usize, max_batch: usize) -> Self {
        self.min_batch = min_batch;
        self.max_batch = max_batch;
        self
    }

    /// Sets the cursor marker.
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// The inclusive range batch sizes are drawn from.
    ///
    /// The bounds are put in order and never drop below one, so a cadence
    /// that fails [`Cadence::validate`] still paces instead of panicking.
    pub fn batch_range(&self) -> RangeInclusive<usize> {
        let low = self.min_batch.min(self.max_batch).max(1);
        let high = self.min_batch.max(self.max_batch).max(low);
        low..=high
    }

    /// Checks the cadence can be sampled.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or inverted batch range or an
    /// empty cursor.
    pub fn validate(&self) -> Result<()> {
        if self.min_batch == 0 {
            return Err(Error::validation(
                "min_batch must be at least 1",
                Some("min_batch".to_string()),
            ));
        }
        if self.min_batch > self.max_batch {
            return Err(Error::validation(
                format!(
                    "min_batch ({}) exceeds max_batch ({})",
                    self.min_batch, self.max_batch
                ),
                Some("max_batch".to_string()),
            ));
        }
        if self.cursor.is_empty() {
            return Err(Error::validation(
                "cursor must not be empty",
                Some("cursor".to_string()),
            ));
        }
        Ok(())
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            min_batch: DEFAULT_MIN_BATCH,
            max_batch: DEFAULT_MAX_BATCH,
            delay_ms: DEFAULT_DELAY_MS,
            cursor: DEFAULT_CURSOR.to_string(),
        }
    }
}

/// The user-visible messages a failed turn ends with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    /// Shown when the collaborator refuses the content on policy grounds.
    pub blocked: String,
    /// Shown for every other failure.
    pub failure: String,
    /// Shown when an image question arrives before any image.
    pub missing_image: String,
    /// Show the raw error instead of `failure`.
    pub expose_detail: bool,
}

impl ErrorMessages {
    /// The message describing `err`.
    pub fn describe(&self, err: &Error) -> String {
        if err.is_blocked() {
            self.blocked.clone()
        } else if self.expose_detail {
            format!("Error: {err}")
        } else {
            self.failure.clone()
        }
    }

    /// The final text of a turn that failed after revealing `partial`.
    pub fn compose(&self, partial: &str, err: &Error) -> String {
        let message = self.describe(err);
        if partial.is_empty() {
            message
        } else {
            format!("{partial}\n\n{message}")
        }
    }
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            blocked: "Sorry, that request was blocked by the safety filter. Please rephrase and try again.".to_string(),
            failure: "Error! Please try again!".to_string(),
            missing_image: "Please upload an image first".to_string(),
            expose_detail: false,
        }
    }
}

/// How a reveal ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RevealStatus {
    /// The stream was exhausted normally.
    Completed,
    /// The collaborator refused the content.
    Blocked,
    /// Dispatch or streaming failed for another reason.
    Failed,
}

/// The terminal state of one reveal.
#[derive(Debug, Clone)]
pub struct Reveal {
    /// The final text left in the slot and recorded as the reply.
    pub text: String,
    /// How the reveal ended.
    pub status: RevealStatus,
    /// Number of intermediate (cursor-bearing) updates pushed.
    pub updates: usize,
    /// Number of chunks consumed.
    pub chunks: usize,
    /// The failure that ended the reveal, if any.
    pub error: Option<Error>,
}

impl Reveal {
    /// True when the stream was exhausted normally.
    pub fn is_completed(&self) -> bool {
        self.status == RevealStatus::Completed
    }
}

/// Renders a chunk stream into a [`DisplaySlot`] at a steady cadence.
pub struct RevealRenderer<R: Rng + Send = StdRng> {
    cadence: Cadence,
    messages: ErrorMessages,
    loading_text: Option<String>,
    rng: R,
    logger: Option<Arc<dyn ExchangeLogger>>,
    flow: Flow,
}

impl RevealRenderer<StdRng> {
    /// Creates a renderer whose cadence is seeded from the operating system.
    pub fn new(cadence: Cadence, messages: ErrorMessages) -> Self {
        Self::with_rng(cadence, messages, StdRng::from_entropy())
    }

    /// Creates a renderer whose cadence is reproducible from `seed`.
    pub fn seeded(cadence: Cadence, messages: ErrorMessages, seed: u64) -> Self {
        Self::with_rng(cadence, messages, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RevealRenderer<R> {
    /// Creates a renderer drawing batch sizes from `rng`.
    pub fn with_rng(cadence: Cadence, messages: ErrorMessages, rng: R) -> Self {
        if let Err(err) = cadence.validate() {
            let range = cadence.batch_range();
            warn!(error = %err, low = range.start(), high = range.end(), "cadence normalized");
        }
        Self {
            cadence,
            messages,
            loading_text: None,
            rng,
            logger: None,
            flow: Flow::Text,
        }
    }

    /// Shows `text` in the slot before the first chunk arrives.
    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = Some(text.into());
        self
    }

    /// Reports every chunk to `logger`, tagged with `flow`.
    pub fn with_logger(mut self, flow: Flow, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.flow = flow;
        self.logger = Some(logger);
        self
    }

    /// Tags logged chunks with `flow`.
    pub fn for_flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }

    /// The active cadence.
    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    /// The active failure messages.
    pub fn messages(&self) -> &ErrorMessages {
        &self.messages
    }

    /// Samples the next batch size from [`Cadence::batch_range`].
    pub fn next_threshold(&mut self) -> usize {
        self.rng.gen_range(self.cadence.batch_range())
    }

    /// Reveals `stream` into `slot` and returns the terminal state.
    ///
    /// Chunks are consumed in arrival order. The final text always equals the
    /// concatenation of every chunk received, followed by a failure message
    /// if the stream ended in error.
    pub async fn reveal<S>(&mut self, stream: S, slot: &mut dyn DisplaySlot) -> Reveal
    where
        S: Stream<Item = Result<StreamChunk>>,
    {
        let start = Instant::now();
        let mut stream = std::pin::pin!(stream);
        if let Some(loading) = &self.loading_text {
            slot.show_loading(loading);
        }

        let mut text = String::new();
        let mut updates = 0;
        let mut chunks = 0;
        let mut failure = None;
        while let Some(item) = stream.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            };
            chunks += 1;
            REVEAL_CHUNKS.click();
            if let Some(logger) = &self.logger {
                logger.log_chunk(self.flow, &chunk);
            }

            let mut count = 0;
            let mut threshold = self.next_threshold();
            for c in chunk.text.chars() {
                text.push(c);
                count += 1;
                REVEAL_CHARS.click();
                if count == threshold {
                    self.pause().await;
                    slot.show(&format!("{text}{}", self.cadence.cursor));
                    updates += 1;
                    REVEAL_UPDATES.click();
                    count = 0;
                    threshold = self.next_threshold();
                }
            }
        }

        let (text, status) = match &failure {
            None => (text, RevealStatus::Completed),
            Some(err) => {
                warn!(flow = %self.flow, error = %err, revealed = text.len(), "reply stream failed");
                let status = if err.is_blocked() {
                    REVEAL_BLOCKED.click();
                    RevealStatus::Blocked
                } else {
                    REVEAL_FAILURES.click();
                    RevealStatus::Failed
                };
                (self.messages.compose(&text, err), status)
            }
        };
        slot.show(&text);
        slot.finish();

        REVEAL_DURATION.add(start.elapsed().as_secs_f64());
        debug!(flow = %self.flow, chunks, updates, ?status, "reveal finished");
        Reveal {
            text,
            status,
            updates,
            chunks,
            error: failure,
        }
    }

    async fn pause(&self) {
        if self.cadence.delay_ms > 0 {
            tokio::time::sleep(self.cadence.delay()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::chunk_stream;
    use crate::render::RecordingSlot;

    fn renderer(seed: u64) -> RevealRenderer {
        RevealRenderer::seeded(Cadence::default(), ErrorMessages::default(), seed)
    }

    fn ok_chunks(texts: &[&str]) -> Vec<Result<String>> {
        texts.iter().map(|t| Ok(t.to_string())).collect()
    }

    #[test]
    fn thresholds_stay_in_range() {
        let mut renderer = renderer(7);
        for _ in 0..10_000 {
            let t = renderer.next_threshold();
            assert!((5..=10).contains(&t), "threshold {t} out of range");
        }
    }

    #[test]
    fn every_threshold_is_reachable() {
        let mut renderer = renderer(11);
        let mut seen = [false; 11];
        for _ in 0..10_000 {
            seen[renderer.next_threshold()] = true;
        }
        assert!(seen[5..=10].iter().all(|s| *s));
    }

    #[tokio::test(start_paused = true)]
    async fn final_update_is_concatenation() {
        let mut slot = RecordingSlot::new();
        let chunks = ["The quick brown fox ", "jumps over ", "", "the lazy dog. 😊"];
        let reveal = renderer(3)
            .reveal(chunk_stream(ok_chunks(&chunks)), &mut slot)
            .await;

        let expected = chunks.concat();
        assert!(reveal.is_completed());
        assert_eq!(reveal.text, expected);
        assert_eq!(reveal.chunks, 4);
        assert_eq!(slot.current(), Some(expected.as_str()));
        assert_eq!(slot.finished, 1);
        assert!(reveal.updates <= expected.chars().count());
        assert_eq!(slot.intermediate().len(), reveal.updates);
    }

    #[tokio::test(start_paused = true)]
    async fn intermediate_updates_are_prefixes_with_cursor() {
        let mut slot = RecordingSlot::new();
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let reveal = renderer(5)
            .reveal(chunk_stream(ok_chunks(&[text])), &mut slot)
            .await;

        assert!(reveal.updates >= 36 / 10);
        assert!(reveal.updates <= 36 / 5);
        let mut last_len = 0;
        for update in slot.intermediate() {
            let body = update.strip_suffix('_').expect("cursor missing");
            assert!(text.starts_with(body));
            let grew = body.len() - last_len;
            assert!((5..=10).contains(&grew), "batch of {grew}");
            last_len = body.len();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cadence_is_reproducible_from_seed() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";
        let mut first = RecordingSlot::new();
        let mut second = RecordingSlot::new();
        renderer(42)
            .reveal(chunk_stream(ok_chunks(&[text])), &mut first)
            .await;
        renderer(42)
            .reveal(chunk_stream(ok_chunks(&[text])), &mut second)
            .await;
        assert_eq!(first, second);

        let mut rng = StdRng::seed_from_u64(42);
        let mut expected = Vec::new();
        let mut count = 0;
        let mut threshold: usize = rng.gen_range(5..=10);
        for (i, _) in text.char_indices() {
            count += 1;
            if count == threshold {
                expected.push(format!("{}_", &text[..=i]));
                count = 0;
                threshold = rng.gen_range(5..=10);
            }
        }
        assert_eq!(first.intermediate(), expected.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn counter_restarts_with_each_chunk() {
        let mut slot = RecordingSlot::new();
        let cadence = Cadence::default().with_batch(3, 3);
        let mut renderer = RevealRenderer::seeded(cadence, ErrorMessages::default(), 0);
        let reveal = renderer
            .reveal(chunk_stream(ok_chunks(&["ab", "cd", "efg"])), &mut slot)
            .await;
        assert_eq!(reveal.updates, 1);
        assert_eq!(slot.intermediate(), ["abcdefg_".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_before_each_update() {
        let mut slot = RecordingSlot::new();
        let cadence = Cadence::default().with_batch(2, 2);
        let mut renderer = RevealRenderer::seeded(cadence, ErrorMessages::default(), 0);
        let start = tokio::time::Instant::now();
        let reveal = renderer
            .reveal(chunk_stream(ok_chunks(&["abcdef"])), &mut slot)
            .await;
        assert_eq!(reveal.updates, 3);
        assert_eq!(start.elapsed(), Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_stream_shows_empty_text() {
        let mut slot = RecordingSlot::new();
        let reveal = renderer(1)
            .with_loading_text("Thinking...")
            .reveal(chunk_stream(Vec::new()), &mut slot)
            .await;
        assert!(reveal.is_completed());
        assert_eq!(reveal.text, "");
        assert_eq!(slot.loading, vec!["Thinking..."]);
        assert_eq!(slot.updates, vec![""]);
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_before_any_text_shows_message_alone() {
        let mut slot = RecordingSlot::new();
        let stream = chunk_stream(vec![Err(Error::blocked("prompt blocked", None))]);
        let reveal = renderer(1).reveal(stream, &mut slot).await;
        assert_eq!(reveal.status, RevealStatus::Blocked);
        assert_eq!(reveal.text, ErrorMessages::default().blocked);
        assert_eq!(slot.current(), Some(reveal.text.as_str()));
        assert!(reveal.error.unwrap().is_blocked());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_text_appends_message() {
        let mut slot = RecordingSlot::new();
        let stream = chunk_stream(vec![
            Ok("Partial answer".to_string()),
            Err(Error::streaming("connection reset", None)),
            Ok("never revealed".to_string()),
        ]);
        let reveal = renderer(1).reveal(stream, &mut slot).await;
        assert_eq!(reveal.status, RevealStatus::Failed);
        assert_eq!(reveal.chunks, 1);
        assert_eq!(reveal.text, "Partial answer\n\nError! Please try again!");
    }

    #[test]
    fn exposed_detail_replaces_generic_message() {
        let messages = ErrorMessages {
            expose_detail: true,
            ..ErrorMessages::default()
        };
        let err = Error::timeout("deadline exceeded", None);
        assert_eq!(messages.describe(&err), "Error: Timeout error: deadline exceeded");
        let blocked = Error::blocked("no", None);
        assert_eq!(messages.describe(&blocked), messages.blocked);
    }

    #[tokio::test(start_paused = true)]
    async fn inverted_batch_range_is_reordered() {
        let cadence = Cadence::default().with_batch(6, 5);
        assert_eq!(cadence.batch_range(), 5..=6);
        let mut renderer = RevealRenderer::seeded(cadence, ErrorMessages::default(), 9);
        for _ in 0..1_000 {
            assert!((5..=6).contains(&renderer.next_threshold()));
        }

        let mut slot = RecordingSlot::new();
        let reveal = renderer
            .reveal(chunk_stream(ok_chunks(&["Hello world"])), &mut slot)
            .await;
        assert!(reveal.is_completed());
        assert_eq!(reveal.text, "Hello world");
        assert!(reveal.updates >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_batch_updates_every_character() {
        let cadence = Cadence::default().with_batch(0, 0);
        assert_eq!(cadence.batch_range(), 1..=1);
        let mut renderer = RevealRenderer::seeded(cadence, ErrorMessages::default(), 9);
        let mut slot = RecordingSlot::new();
        let reveal = renderer
            .reveal(chunk_stream(ok_chunks(&["abc"])), &mut slot)
            .await;
        assert_eq!(reveal.updates, 3);
        assert_eq!(slot.intermediate(), ["a_", "ab_", "abc_"].map(String::from));

        let widened = Cadence::default().with_batch(0, 4);
        assert_eq!(widened.batch_range(), 1..=4);
    }

    #[test]
    fn cadence_validation() {
        assert!(Cadence::default().validate().is_ok());
        assert!(Cadence::default().with_batch(0, 3).validate().is_err());
        assert!(Cadence::default().with_batch(6, 5).validate().is_err());
        assert!(Cadence::default().with_cursor("").validate().is_err());
        assert_eq!(
            Cadence::default().with_delay(Duration::from_millis(20)).delay(),
            Duration::from_millis(20)
        );
    }
}
