use serde::{Deserialize, Serialize};

use crate::types::Role;

/// One role-tagged message in a conversation history.
///
/// Turns are immutable once built; histories only ever append or clear them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    /// Create a new turn.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a turn labelled the way the chat collaborator labels its output.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Create an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// The author of this turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The text of this turn.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A turn as it should be shown, with its role translated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    /// The display role; never [`Role::Model`].
    pub role: Role,
    /// The markdown text to show.
    pub text: String,
}

impl From<&Turn> for DisplayEntry {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role().display(),
            text: turn.text().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization() {
        let turn = Turn::model("Hi there!");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"model","text":"Hi there!"}"#);
    }

    #[test]
    fn display_entry_translates_role() {
        let entry = DisplayEntry::from(&Turn::model("hello"));
        assert_eq!(entry.role, Role::Assistant);
        assert_eq!(entry.text, "hello");

        let entry = DisplayEntry::from(&Turn::user("hi"));
        assert_eq!(entry.role, Role::User);
    }
}
