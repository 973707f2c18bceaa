use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use snafu::Snafu;

use crate::model::ModelDescriptor;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Attachment bytes bundled into one chat submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One chat submission as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub model: String,
    pub attachment: Option<AttachmentUpload>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: model.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: AttachmentUpload) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Successful chat response payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub content: String,
    #[serde(default)]
    pub formatted_content: Option<String>,
    /// Session adopted on first successful send, when the backend issues one.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Stored message returned by session load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub formatted_content: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Session listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub last_message: Option<String>,
}

/// Export target format for a session transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

/// Asynchronous media generation job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Opaque media generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaJob {
    pub kind: MediaKind,
    pub prompt: String,
}

/// Media generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    pub url: String,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GatewayError {
    #[snafu(display("backend request failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("backend returned status {status} on `{stage}`: {body}"))]
    Status {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to parse backend payload on `{stage}`: {source}"))]
    Payload {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("backend reported failure on `{stage}`: {message}"))]
    Application {
        stage: &'static str,
        message: String,
    },
    #[snafu(display("backend returned no models"))]
    EmptyModelList { stage: &'static str },
}

/// Seam over every backend collaborator the client talks to.
///
/// The orchestrator and gateway only see this trait; tests script it with an
/// in-memory fake.
pub trait ChatBackend: Send + Sync {
    fn fetch_models<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<ModelDescriptor>>>;

    fn send_chat<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, GatewayResult<ChatReply>>;

    fn create_session<'a>(&'a self) -> BoxFuture<'a, GatewayResult<String>>;

    fn delete_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, GatewayResult<()>>;

    fn load_session<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Vec<StoredMessage>>>;

    fn list_sessions<'a>(&'a self) -> BoxFuture<'a, GatewayResult<Vec<SessionSummary>>>;

    fn export_session<'a>(
        &'a self,
        session_id: &'a str,
        format: ExportFormat,
    ) -> BoxFuture<'a, GatewayResult<Vec<u8>>>;

    fn request_media<'a>(&'a self, job: MediaJob) -> BoxFuture<'a, GatewayResult<MediaArtifact>>;

    fn setup_credential<'a>(&'a self, model: &'a str) -> BoxFuture<'a, GatewayResult<()>>;
}
