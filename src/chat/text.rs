//! The multi-turn text chat flow.

use std::sync::Arc;

use tracing::{debug, info};

use crate::chat::config::ChatConfig;
use crate::chat::{Submission, TurnOutcome};
use crate::client_logger::{ExchangeLogger, Flow};
use crate::collaborator::{ChatCollaborator, failed_stream};
use crate::history::{History, TextHistory};
use crate::input::admit_text;
use crate::observability::{GATE_EMPTY, TEXT_CLEARS, TEXT_TURNS};
use crate::render::DisplaySlot;
use crate::reveal::RevealRenderer;
use crate::types::{SafetySettings, Turn};

/// The text chat: one collaborator, one history, one reply in flight.
///
/// The history mirrors the collaborator's transcript. After a completed
/// exchange the transcript is adopted as-is; after a handled failure the
/// transcript is rewound, the prompt and the shown error text are recorded,
/// and the result is pushed back into the collaborator.
pub struct TextChat<C: ChatCollaborator> {
    collaborator: C,
    history: TextHistory,
    renderer: RevealRenderer,
    safety: SafetySettings,
    logger: Option<Arc<dyn ExchangeLogger>>,
}

impl<C: ChatCollaborator> TextChat<C> {
    /// Creates a text chat answered by `collaborator`.
    pub fn new(collaborator: C, config: &ChatConfig) -> Self {
        Self {
            collaborator,
            history: TextHistory::new(),
            renderer: config.renderer(Flow::Text),
            safety: config.safety.clone(),
            logger: None,
        }
    }

    /// Replaces the reveal renderer.
    pub fn with_renderer(mut self, renderer: RevealRenderer) -> Self {
        self.renderer = renderer.for_flow(Flow::Text);
        if let Some(logger) = &self.logger {
            self.renderer = self.renderer.with_logger(Flow::Text, Arc::clone(logger));
        }
        self
    }

    /// Reports chunks, turns, and failures to `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.renderer = self.renderer.with_logger(Flow::Text, Arc::clone(&logger));
        self.logger = Some(logger);
        self
    }

    /// The text-flow history.
    pub fn history(&self) -> &TextHistory {
        &self.history
    }

    /// The chat collaborator.
    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    /// Submits one prompt and reveals the reply into `slot`.
    ///
    /// An empty prompt is ignored without dispatching. Every failure is
    /// converted into the final text shown in the slot; the chat stays usable.
    pub async fn submit(&mut self, raw: &str, slot: &mut dyn DisplaySlot) -> Submission {
        let prompt = match admit_text(raw) {
            Ok(prompt) => prompt,
            Err(gate) => {
                GATE_EMPTY.click();
                debug!(flow = %Flow::Text, %gate, "prompt not dispatched");
                return Submission::Ignored;
            }
        };

        let before = self.history.len();
        debug!(flow = %Flow::Text, chars = prompt.chars().count(), context = before, "dispatching prompt");
        let stream = match self.collaborator.send_message(&prompt, &self.safety).await {
            Ok(stream) => stream,
            Err(err) => failed_stream(err),
        };
        let reveal = self.renderer.reveal(stream, slot).await;
        TEXT_TURNS.click();

        let mut transcript = self.collaborator.transcript();
        if let Some(err) = &reveal.error {
            if let Some(logger) = &self.logger {
                logger.log_failure(Flow::Text, err);
            }
            transcript.truncate(before);
            transcript.push(Turn::user(prompt));
            transcript.push(Turn::model(reveal.text.clone()));
            self.collaborator.replace_transcript(transcript.clone());
        }
        self.history.replace_with(transcript);

        if let Some(logger) = &self.logger {
            for turn in self.history.turns().iter().skip(before) {
                logger.log_turn(Flow::Text, turn);
            }
        }
        Submission::Answered(TurnOutcome {
            reply: Turn::model(reveal.text),
            status: reveal.status,
            updates: reveal.updates,
        })
    }

    /// Forgets the conversation on both sides.
    pub fn clear(&mut self) {
        self.history.clear();
        self.collaborator.replace_transcript(Vec::new());
        TEXT_CLEARS.click();
        info!(flow = %Flow::Text, "history cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{ScriptedChat, ScriptedReply};
    use crate::error::Error;
    use crate::render::RecordingSlot;
    use crate::reveal::{Cadence, ErrorMessages, RevealStatus};
    use crate::types::{DisplayEntry, HarmBlockThreshold, Role};

    fn chat(replies: Vec<ScriptedReply>) -> TextChat<ScriptedChat> {
        let config = ChatConfig::new().with_pacing_seed(Some(17));
        TextChat::new(ScriptedChat::new(replies), &config)
    }

    fn answered(submission: Submission) -> TurnOutcome {
        match submission {
            Submission::Answered(outcome) => outcome,
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completed_exchange_adopts_transcript() {
        let mut chat = chat(vec![ScriptedReply::chunks(["Hi ", "there!"])]);
        let mut slot = RecordingSlot::new();

        let outcome = answered(chat.submit("Hello", &mut slot).await);
        assert_eq!(outcome.status, RevealStatus::Completed);
        assert_eq!(outcome.reply, Turn::model("Hi there!"));
        assert_eq!(slot.current(), Some("Hi there!"));
        assert_eq!(slot.loading, vec!["Thinking..."]);
        assert_eq!(
            chat.history().render_all().last(),
            Some(&DisplayEntry {
                role: Role::Assistant,
                text: "Hi there!".to_string(),
            })
        );
        assert_eq!(chat.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_is_normalized_before_dispatch() {
        let mut chat = chat(vec![ScriptedReply::chunks(["ok"])]);
        let mut slot = RecordingSlot::new();
        chat.submit("line one\nline two", &mut slot).await;
        assert_eq!(chat.collaborator().prompts(), ["line one  \nline two".to_string()]);
        assert_eq!(chat.history().turns()[0].text(), "line one  \nline two");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_prompt_is_ignored() {
        let mut chat = chat(vec![]);
        let mut slot = RecordingSlot::new();
        assert!(matches!(chat.submit("   ", &mut slot).await, Submission::Ignored));
        assert!(chat.collaborator().prompts().is_empty());
        assert!(chat.history().is_empty());
        assert!(slot.updates.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_failure_records_error_turn() {
        let mut chat = chat(vec![
            ScriptedReply::chunks(["first answer"]),
            ScriptedReply::Reject(Error::connection("refused", None)),
        ]);
        let mut slot = RecordingSlot::new();
        chat.submit("first", &mut slot).await;

        let mut slot = RecordingSlot::new();
        let outcome = answered(chat.submit("second", &mut slot).await);
        assert_eq!(outcome.status, RevealStatus::Failed);
        assert_eq!(slot.current(), Some("Error! Please try again!"));
        assert_eq!(
            chat.history().turns(),
            [
                Turn::user("first"),
                Turn::model("first answer"),
                Turn::user("second"),
                Turn::model("Error! Please try again!"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn collaborator_agrees_after_failure() {
        let mut chat = chat(vec![
            ScriptedReply::FailAfter(vec!["Part".to_string()], Error::streaming("reset", None)),
            ScriptedReply::chunks(["recovered"]),
        ]);
        let mut slot = RecordingSlot::new();
        let outcome = answered(chat.submit("one", &mut slot).await);
        assert_eq!(outcome.reply.text(), "Part\n\nError! Please try again!");

        chat.submit("two", &mut slot).await;
        let texts: Vec<&str> = chat.history().turns().iter().map(Turn::text).collect();
        assert_eq!(
            texts,
            ["one", "Part\n\nError! Please try again!", "two", "recovered"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_prompt_shows_blocked_message() {
        let mut chat = chat(vec![ScriptedReply::blocked("prompt blocked")]);
        let mut slot = RecordingSlot::new();
        let outcome = answered(chat.submit("something", &mut slot).await);
        assert_eq!(outcome.status, RevealStatus::Blocked);
        assert_eq!(outcome.reply.text(), ErrorMessages::default().blocked);
    }

    #[tokio::test(start_paused = true)]
    async fn safety_is_sent_with_every_prompt() {
        let safety = SafetySettings::uniform(HarmBlockThreshold::BlockLowAndAbove);
        let config = ChatConfig::new().with_safety(safety.clone());
        let mut chat = TextChat::new(ScriptedChat::new([ScriptedReply::chunks(["x"])]), &config);
        let mut slot = RecordingSlot::new();
        chat.submit("hi", &mut slot).await;
        assert_eq!(chat.collaborator().last_safety(), Some(&safety));
    }

    #[tokio::test(start_paused = true)]
    async fn inverted_cadence_still_answers() {
        let config = ChatConfig::new()
            .with_cadence(Cadence::default().with_batch(6, 5))
            .with_pacing_seed(Some(4));
        let mut chat = TextChat::new(
            ScriptedChat::new([ScriptedReply::chunks(["Hello world"])]),
            &config,
        );
        let mut slot = RecordingSlot::new();
        let outcome = answered(chat.submit("hi", &mut slot).await);
        assert_eq!(outcome.status, RevealStatus::Completed);
        assert_eq!(slot.current(), Some("Hello world"));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_forgets_both_sides() {
        let mut chat = chat(vec![
            ScriptedReply::chunks(["a"]),
            ScriptedReply::chunks(["b"]),
        ]);
        let mut slot = RecordingSlot::new();
        chat.submit("one", &mut slot).await;
        chat.clear();
        assert!(chat.history().render_all().is_empty());

        chat.submit("two", &mut slot).await;
        assert_eq!(chat.history().turns(), [Turn::user("two"), Turn::model("b")]);
    }
}
