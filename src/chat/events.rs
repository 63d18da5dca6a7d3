//! User actions a session responds to.

use crate::types::ImageQuery;

/// One user action against a session.
///
/// A front-end translates its own input (a form submit, a button, a slash
/// command) into these and hands them to [`crate::chat::Session::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Send a prompt to the text chat.
    SubmitText(String),

    /// Forget the text conversation.
    ClearChat,

    /// Replace the image under discussion.
    UploadImage(ImageQuery),

    /// Drop the image under discussion.
    RemoveImage,

    /// Ask a question about the current image.
    SubmitImagePrompt(String),
}

impl SessionEvent {
    /// A short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SubmitText(_) => "submit_text",
            SessionEvent::ClearChat => "clear_chat",
            SessionEvent::UploadImage(_) => "upload_image",
            SessionEvent::RemoveImage => "remove_image",
            SessionEvent::SubmitImagePrompt(_) => "submit_image_prompt",
        }
    }

    /// True for events that may dispatch a request.
    pub fn is_prompt(&self) -> bool {
        matches!(
            self,
            SessionEvent::SubmitText(_) | SessionEvent::SubmitImagePrompt(_)
        )
    }
}
