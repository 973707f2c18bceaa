use sypha_content::Document;

use crate::chat::message::{ChatMessage, ResponseId};

/// Append-only message list for the chat pane.
///
/// Entries are only ever appended within a conversation; the list is
/// replaced wholesale on session switch or clear.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Wholesale replacement for session switch / chat clear.
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}

/// One enhanced response ready for the split pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub id: ResponseId,
    pub document: Document,
}

/// Dedicated response pane. Shows only the most recent response.
#[derive(Debug, Clone, Default)]
pub struct SplitPane {
    current: Option<RenderedResponse>,
}

impl SplitPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&RenderedResponse> {
        self.current.as_ref()
    }

    /// Replaces displayed content, returning the id that lost the latest
    /// flag.
    pub fn replace(&mut self, response: RenderedResponse) -> Option<ResponseId> {
        self.current.replace(response).map(|previous| previous.id)
    }

    /// Deferred-purge completion after a view reset.
    pub fn purge(&mut self) {
        self.current = None;
    }
}
