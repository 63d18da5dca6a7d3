//! Display slots for streamed replies.
//!
//! A [`DisplaySlot`] is the single mutable region a reply is revealed into.
//! Every update replaces the previous content; it is never appended to.

use std::io::{self, Stdout, Write};

/// ANSI escape code for dim text (used for the loading placeholder).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for yellow text (used for warnings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code clearing from the cursor to the end of the screen.
const ANSI_CLEAR_TO_END: &str = "\x1b[J";

/// A single region that is rewritten as a reply streams in.
pub trait DisplaySlot: Send {
    /// Replace the slot's content.
    fn show(&mut self, content: &str);

    /// Show the placeholder displayed while waiting for the first chunk.
    fn show_loading(&mut self, text: &str) {
        self.show(text);
    }

    /// Show a warning instead of dispatching a request.
    fn warn(&mut self, text: &str) {
        self.show(text);
    }

    /// Called once after the final update.
    fn finish(&mut self) {}
}

/// Terminal display slot.
///
/// With ANSI enabled the slot is redrawn in place: the cursor returns to the
/// start of the slot and everything below is cleared before each update.
/// Without ANSI, intermediate updates cannot be erased, so only the final
/// content is written, on [`DisplaySlot::finish`].
pub struct TerminalSlot<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    drawn_lines: usize,
    pending: String,
}

impl TerminalSlot<Stdout> {
    /// Creates a slot on stdout with ANSI redraw enabled.
    pub fn new() -> Self {
        Self::with_writer(io::stdout(), true)
    }

    /// Creates a slot on stdout with the specified ANSI setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for TerminalSlot<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> TerminalSlot<W> {
    /// Creates a slot on an arbitrary writer.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            drawn_lines: 0,
            pending: String::new(),
        }
    }

    /// Consumes the slot and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(&mut self, prefix: &str, content: &str, suffix: &str) {
        let _ = write!(self.out, "\r");
        if self.drawn_lines > 0 {
            let _ = write!(self.out, "\x1b[{}A", self.drawn_lines);
        }
        let _ = write!(self.out, "{ANSI_CLEAR_TO_END}{prefix}{content}{suffix}");
        self.drawn_lines = content.matches('\n').count();
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> DisplaySlot for TerminalSlot<W> {
    fn show(&mut self, content: &str) {
        if self.use_color {
            self.redraw("", content, "");
        } else {
            self.pending.clear();
            self.pending.push_str(content);
        }
    }

    fn show_loading(&mut self, text: &str) {
        if self.use_color {
            self.redraw(ANSI_DIM, text, ANSI_RESET);
        }
    }

    fn warn(&mut self, text: &str) {
        if self.use_color {
            let _ = writeln!(self.out, "{ANSI_YELLOW}{text}{ANSI_RESET}");
        } else {
            let _ = writeln!(self.out, "Warning: {text}");
        }
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        if !self.use_color {
            let _ = write!(self.out, "{}", self.pending);
            self.pending.clear();
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
        self.drawn_lines = 0;
    }
}

/// A display slot that records everything pushed into it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSlot {
    /// The loading placeholders shown, in order.
    pub loading: Vec<String>,
    /// Every content update, in order; the last one is what stays on screen.
    pub updates: Vec<String>,
    /// Warnings shown instead of dispatching.
    pub warnings: Vec<String>,
    /// How many times the slot was finished.
    pub finished: usize,
}

impl RecordingSlot {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// The content currently on screen, if any.
    pub fn current(&self) -> Option<&str> {
        self.updates.last().map(String::as_str)
    }

    /// Updates pushed before the final one.
    pub fn intermediate(&self) -> &[String] {
        match self.updates.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

impl DisplaySlot for RecordingSlot {
    fn show(&mut self, content: &str) {
        self.updates.push(content.to_string());
    }

    fn show_loading(&mut self, text: &str) {
        self.loading.push(text.to_string());
    }

    fn warn(&mut self, text: &str) {
        self.warnings.push(text.to_string());
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(slot: TerminalSlot<Vec<u8>>) -> String {
        String::from_utf8(slot.into_inner()).unwrap()
    }

    #[test]
    fn plain_slot_writes_only_final_content() {
        let mut slot = TerminalSlot::with_writer(Vec::new(), false);
        slot.show_loading("Thinking...");
        slot.show("Hi_");
        slot.show("Hi there!");
        slot.finish();
        assert_eq!(written(slot), "Hi there!\n");
    }

    #[test]
    fn ansi_slot_redraws_in_place() {
        let mut slot = TerminalSlot::with_writer(Vec::new(), true);
        slot.show("one\ntw_");
        slot.show("one\ntwo");
        slot.finish();
        let out = written(slot);
        assert_eq!(
            out,
            "\r\x1b[Jone\ntw_\r\x1b[1A\x1b[Jone\ntwo\n",
        );
    }

    #[test]
    fn plain_slot_prefixes_warnings() {
        let mut slot = TerminalSlot::with_writer(Vec::new(), false);
        slot.warn("Please upload an image first");
        assert_eq!(written(slot), "Warning: Please upload an image first\n");
    }

    #[test]
    fn recording_slot_splits_final_update() {
        let mut slot = RecordingSlot::new();
        assert_eq!(slot.current(), None);
        assert!(slot.intermediate().is_empty());

        slot.show_loading("Thinking...");
        slot.show("ab_");
        slot.show("abc");
        slot.finish();
        assert_eq!(slot.loading, vec!["Thinking..."]);
        assert_eq!(slot.current(), Some("abc"));
        assert_eq!(slot.intermediate(), ["ab_".to_string()]);
        assert_eq!(slot.finished, 1);
    }
}
