use chrono::{DateTime, Local};
use sypha_content::{FileClass, MessageBody, classify_file};
use sypha_gateway::AttachmentUpload;

pub use sypha_content::Role;

/// Identifier for one submission round-trip.
///
/// Strictly increasing per pane; a resolution whose seq is not the most
/// recent issued is stale and must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionSeq(pub u64);

impl SubmissionSeq {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Identifier for one rendered assistant response in the split pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseId(pub u64);

impl ResponseId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Attachment descriptor carried on a message after send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub name: String,
    pub size: usize,
    pub class: FileClass,
}

/// Transient compose-state attachment, cleared after every send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub name: String,
    pub bytes: Vec<u8>,
    pub class: FileClass,
}

impl FileAttachment {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let class = classify_file(&name);
        Self { name, bytes, class }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn descriptor(&self) -> AttachmentDescriptor {
        AttachmentDescriptor {
            name: self.name.clone(),
            size: self.bytes.len(),
            class: self.class,
        }
    }

    pub fn into_upload(self) -> AttachmentUpload {
        AttachmentUpload {
            file_name: self.name,
            bytes: self.bytes,
        }
    }
}

/// One transcript entry. Appended, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub body: MessageBody,
    pub model: Option<String>,
    pub attachment: Option<AttachmentDescriptor>,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(role: Role, body: MessageBody) -> Self {
        Self {
            role,
            body,
            model: None,
            attachment: None,
            timestamp: Local::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageBody::plain(text))
    }

    pub fn assistant(body: MessageBody) -> Self {
        Self::new(Role::Assistant, body)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, MessageBody::plain(text))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentDescriptor) -> Self {
        self.attachment = Some(attachment);
        self
    }
}
