use std::sync::Arc;

use snafu::Snafu;
use sypha_content::{
    Document, MAX_ATTACHMENT_BYTES, MessageBody, enhance, post_process_code_blocks,
    post_process_tables,
};
use sypha_gateway::{
    ChatBackend, ChatReply, ChatRequest, ExportFormat, GatewayError, GatewayResult, MediaArtifact,
    MediaJob, ModelCatalog, ModelCatalogSource, ModelGateway, SelectionRejection, SessionSummary,
};

use crate::chat::message::{ChatMessage, FileAttachment, ResponseId, Role, SubmissionSeq};
use crate::chat::pane::{RenderedResponse, SplitPane, Transcript};
use crate::chat::view_state::{ViewEffect, ViewState, ViewStateMachine};
use crate::session::{SessionContext, SessionId};
use crate::viewport::ViewPort;

/// Opening assistant message when model discovery succeeds.
pub const GREETING: &str = "👋 Hi! I'm Sypha, your AI assistant.\n\n\
    I'm here to help you with questions, analyze files, write code, and much more.\n\n\
    Select a model above and let's get started!";

/// Opening message when model discovery fails and the fallback set is live.
pub const CONNECTIVITY_NOTICE: &str = "⚠️ Connection Issue\n\n\
    I'm having trouble connecting to Ollama. Please make sure:\n\
    - Ollama is running (`ollama serve`)\n\
    - You have at least one model installed (`ollama pull llama2`)\n\n\
    Once that's sorted, I'll be ready to help! 😊";

pub type SubmitResult<T> = Result<T, SubmitError>;

/// Synchronous, pre-network submission failures.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum SubmitError {
    #[snafu(display("please select a model first"))]
    NoModelSelected { stage: &'static str },
    #[snafu(display("model '{name}' is not in the current catalog"))]
    UnknownModel { stage: &'static str, name: String },
    #[snafu(display("model '{name}' requires credential setup before use"))]
    GatedModel { stage: &'static str, name: String },
    #[snafu(display("please enter a message or attach a file"))]
    EmptySubmission { stage: &'static str },
    #[snafu(display("attachment is {size} bytes; the limit is {limit}"))]
    AttachmentTooLarge {
        stage: &'static str,
        size: usize,
        limit: usize,
    },
    #[snafu(display("a submission is already in flight"))]
    InFlight { stage: &'static str },
}

/// Export failures, including the no-session gate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExportError {
    #[snafu(display("export requires an active session"))]
    NoActiveSession { stage: &'static str },
    #[snafu(display("export failed: {source}"))]
    Backend {
        stage: &'static str,
        source: GatewayError,
    },
}

/// Metadata for the one submission allowed in flight.
#[derive(Debug, Clone)]
struct PendingSubmission {
    seq: SubmissionSeq,
    model: String,
    /// Composed text, restored into the input on failure for retry.
    composed_text: String,
}

/// Owns all mutable client state and mutates it only through its public
/// operations: the session slot, panes, view mode, selection, compose
/// state, and the single-flight/sequence bookkeeping.
pub struct ChatOrchestrator<V: ViewPort> {
    backend: Arc<dyn ChatBackend>,
    gateway: ModelGateway,
    session: SessionContext,
    transcript: Transcript,
    split: SplitPane,
    view: ViewStateMachine,
    viewport: V,
    selected_model: Option<String>,
    input_text: String,
    attachment: Option<FileAttachment>,
    in_flight: bool,
    pending: Option<PendingSubmission>,
    next_seq: u64,
    next_response: u64,
}

impl<V: ViewPort> ChatOrchestrator<V> {
    pub fn new(backend: Arc<dyn ChatBackend>, viewport: V) -> Self {
        Self {
            gateway: ModelGateway::new(backend.clone()),
            backend,
            session: SessionContext::new(),
            transcript: Transcript::new(),
            split: SplitPane::new(),
            view: ViewStateMachine::new(),
            viewport,
            selected_model: None,
            input_text: String::new(),
            attachment: None,
            in_flight: false,
            pending: None,
            next_seq: 0,
            next_response: 0,
        }
    }

    /// Loads models, picks the default selection, and renders either the
    /// greeting or the connectivity notice.
    pub async fn initialize(&mut self) {
        let catalog = self.gateway.load_models().await;
        let source = catalog.source;
        let selected = catalog
            .default_selection()
            .map(|descriptor| descriptor.name.clone());

        self.selected_model = selected.clone();
        let models = self.gateway.catalog().models.clone();
        self.viewport
            .model_options_changed(&models, selected.as_deref().unwrap_or(""));
        self.viewport.export_enabled_changed(self.session.is_active());

        match source {
            ModelCatalogSource::BackendApi => {
                self.push_message(ChatMessage::assistant(MessageBody::plain(GREETING)));
            }
            ModelCatalogSource::StaticFallback => {
                self.push_message(ChatMessage::assistant(MessageBody::plain(
                    CONNECTIVITY_NOTICE,
                )));
            }
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        self.gateway.catalog()
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn split_pane(&self) -> &SplitPane {
        &self.split
    }

    pub fn view_state(&self) -> ViewState {
        self.view.state()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn attachment(&self) -> Option<&FileAttachment> {
        self.attachment.as_ref()
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Mirrors the composer text as typed.
    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// Stages an attachment for the next submission.
    pub fn attach_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> SubmitResult<()> {
        let attachment = FileAttachment::new(name, bytes);
        if attachment.size() > MAX_ATTACHMENT_BYTES {
            return AttachmentTooLargeSnafu {
                stage: "attach-file",
                size: attachment.size(),
                limit: MAX_ATTACHMENT_BYTES,
            }
            .fail();
        }

        self.attachment = Some(attachment);
        Ok(())
    }

    pub fn remove_attachment(&mut self) {
        self.attachment = None;
        self.viewport.attachment_cleared();
    }

    /// Changes the active selection, enforcing the gating policy.
    ///
    /// A gated, unavailable model never sticks: the selection reverts to the
    /// first unrestricted descriptor and the rejection is returned so the
    /// caller can offer credential setup.
    pub fn select_model(&mut self, name: &str) -> Result<(), SelectionRejection> {
        match self.gateway.validate_selection(name) {
            Ok(()) => {
                self.selected_model = Some(name.to_string());
                let models = self.gateway.catalog().models.clone();
                self.viewport.model_options_changed(&models, name);
                Ok(())
            }
            Err(rejection @ SelectionRejection::GatedUnavailable { .. }) => {
                let revert = self
                    .gateway
                    .revert_target()
                    .map(|descriptor| descriptor.name.clone());
                tracing::warn!(
                    model = %name,
                    revert = revert.as_deref().unwrap_or("<none>"),
                    "gated model selected without credential; reverting"
                );
                if let Some(revert) = revert {
                    self.selected_model = Some(revert.clone());
                    let models = self.gateway.catalog().models.clone();
                    self.viewport.model_options_changed(&models, &revert);
                }
                Err(rejection)
            }
            Err(rejection) => Err(rejection),
        }
    }

    /// Runs credential setup for a gated model, then selects it.
    pub async fn unlock_model(&mut self, name: &str) -> GatewayResult<()> {
        self.gateway.complete_credential_setup(name).await?;
        let _ = self.select_model(name);
        Ok(())
    }

    /// Full submission round-trip. In-flight submits are ignored because the
    /// affordance is disabled; a re-entrant call is a stale click.
    pub async fn submit(&mut self) -> SubmitResult<()> {
        if self.in_flight {
            tracing::debug!("ignoring submit while a request is outstanding");
            return Ok(());
        }

        let (seq, request) = match self.prepare_submission() {
            Ok(prepared) => prepared,
            Err(error) => {
                self.fail_validation(&error);
                return Err(error);
            }
        };

        let result = self.backend.send_chat(request).await;
        self.apply_resolution(seq, result);
        Ok(())
    }

    /// Synchronous half of a submission: validate, append the user message,
    /// stamp a sequence number, and build the wire request.
    pub fn prepare_submission(&mut self) -> SubmitResult<(SubmissionSeq, ChatRequest)> {
        snafu::ensure!(!self.in_flight, InFlightSnafu { stage: "prepare" });

        let model = self
            .selected_model
            .clone()
            .ok_or_else(|| NoModelSelectedSnafu { stage: "prepare" }.build())?;
        match self.gateway.validate_selection(&model) {
            Ok(()) => {}
            Err(SelectionRejection::UnknownModel { name }) => {
                return UnknownModelSnafu {
                    stage: "prepare",
                    name,
                }
                .fail();
            }
            Err(SelectionRejection::GatedUnavailable { name }) => {
                return GatedModelSnafu {
                    stage: "prepare",
                    name,
                }
                .fail();
            }
        }

        let text = self.input_text.trim().to_string();
        snafu::ensure!(
            !text.is_empty() || self.attachment.is_some(),
            EmptySubmissionSnafu { stage: "prepare" }
        );

        self.next_seq += 1;
        let seq = SubmissionSeq::new(self.next_seq);
        self.in_flight = true;
        self.pending = Some(PendingSubmission {
            seq,
            model: model.clone(),
            composed_text: text.clone(),
        });

        let attachment = self.attachment.take();
        let display_text = if text.is_empty() {
            "File uploaded".to_string()
        } else {
            text.clone()
        };
        let mut user_message = ChatMessage::user(display_text).with_model(model.clone());
        if let Some(attachment) = &attachment {
            user_message = user_message.with_attachment(attachment.descriptor());
        }
        self.push_message(user_message);

        let mut request = ChatRequest::new(text, model);
        if let Some(attachment) = attachment {
            request = request.with_attachment(attachment.into_upload());
        }

        self.input_text.clear();
        self.viewport.input_text_changed("");
        self.viewport.attachment_cleared();
        self.viewport.sending_changed(true);

        Ok((seq, request))
    }

    /// Applies one resolution. Only the most recently issued sequence number
    /// is accepted; anything older is a stale response and is discarded.
    pub fn apply_resolution(&mut self, seq: SubmissionSeq, result: GatewayResult<ChatReply>) {
        let Some(pending) = self.pending.clone() else {
            tracing::debug!(seq = seq.0, "discarding resolution with nothing pending");
            return;
        };
        if pending.seq != seq {
            tracing::debug!(
                stale_seq = seq.0,
                latest_seq = pending.seq.0,
                "discarding stale resolution"
            );
            return;
        }

        self.in_flight = false;
        self.pending = None;

        match result {
            Ok(reply) => self.apply_success(&pending, reply),
            Err(error) => self.apply_failure(&pending, &error),
        }

        self.attachment = None;
        self.viewport.attachment_cleared();
        self.viewport.sending_changed(false);
        self.viewport.focus_input();
    }

    fn apply_success(&mut self, pending: &PendingSubmission, reply: ChatReply) {
        if let Some(session_id) = reply.session_id.clone()
            && !self.session.is_active()
        {
            self.session.replace(SessionId::new(session_id));
            self.viewport.export_enabled_changed(true);
        }

        let body = match reply.formatted_content {
            Some(formatted) => MessageBody::formatted(formatted),
            None => MessageBody::plain(reply.content),
        };
        let message = ChatMessage::assistant(body).with_model(pending.model.clone());
        let document = self.push_message(message);

        self.next_response += 1;
        let response = RenderedResponse {
            id: ResponseId::new(self.next_response),
            document,
        };
        self.split.replace(response.clone());

        match self.view.response_arrived(response.id) {
            ViewEffect::EnteredSplit(_) => {
                self.viewport.view_changed(self.view.state());
                self.viewport.response_replaced(&response);
            }
            ViewEffect::ReplacedLatest { .. } => {
                // Split stays split; only the displayed content changes.
                self.viewport.response_replaced(&response);
            }
            ViewEffect::ResetDeferred | ViewEffect::NoChange => {}
        }
    }

    fn apply_failure(&mut self, pending: &PendingSubmission, error: &GatewayError) {
        tracing::error!(
            seq = pending.seq.0,
            model = %pending.model,
            error = %error,
            "chat submission failed"
        );

        self.push_message(ChatMessage::system(format!("❌ Error: {error}")));

        // Composed text comes back for retry; the attachment does not.
        self.input_text = pending.composed_text.clone();
        self.viewport.input_text_changed(&pending.composed_text);
    }

    /// Local recovery for synchronous validation failures: describe the
    /// problem in-pane and return the UI to a fully interactive state.
    fn fail_validation(&mut self, error: &SubmitError) {
        self.push_message(ChatMessage::system(format!("⚠️ {error}")));
        self.attachment = None;
        self.viewport.attachment_cleared();
        self.viewport.focus_input();
    }

    /// Creates a fresh backend session and starts an empty conversation.
    pub async fn new_session(&mut self) -> GatewayResult<()> {
        let session_id = self.backend.create_session().await?;
        self.session.replace(SessionId::new(session_id));
        self.viewport.export_enabled_changed(true);

        self.clear_chat();
        self.push_message(ChatMessage::system("🎉 New chat session started!"));
        Ok(())
    }

    /// Clears the transcript and returns to the unified arrangement.
    ///
    /// Split-pane content survives until `finish_view_reset` so the exit
    /// transition can play over it.
    pub fn clear_chat(&mut self) {
        if self.view.user_reset() == ViewEffect::ResetDeferred {
            self.viewport.view_changed(self.view.state());
        }
        self.transcript.reset();
        self.viewport.transcript_cleared();
        self.push_message(ChatMessage::assistant(MessageBody::plain(GREETING)));
    }

    /// Completes a deferred view reset by purging the split pane.
    pub fn finish_view_reset(&mut self) {
        if self.view.finish_reset() {
            self.split.purge();
        }
    }

    /// Deletes the active session; the context resets to none.
    pub async fn delete_session(&mut self) -> GatewayResult<()> {
        let Some(session_id) = self.session.id().cloned() else {
            return Ok(());
        };

        self.backend.delete_session(session_id.as_str()).await?;
        self.session.clear();
        self.viewport.export_enabled_changed(false);
        Ok(())
    }

    /// Loads a stored conversation, replacing the transcript wholesale.
    pub async fn load_session(&mut self, session_id: &str) -> GatewayResult<()> {
        let stored = self.backend.load_session(session_id).await?;

        self.session.replace(SessionId::new(session_id));
        self.viewport.export_enabled_changed(true);
        if self.view.user_reset() == ViewEffect::ResetDeferred {
            self.viewport.view_changed(self.view.state());
        }
        self.transcript.reset();
        self.viewport.transcript_cleared();

        for message in stored {
            let role = match message.role.as_str() {
                "user" => Role::User,
                "system" => Role::System,
                _ => Role::Assistant,
            };
            let body = match message.formatted_content {
                Some(formatted) => MessageBody::formatted(formatted),
                None => MessageBody::plain(message.content),
            };
            let mut chat_message = ChatMessage::new(role, body);
            if let Some(model) = message.model {
                chat_message = chat_message.with_model(model);
            }
            self.push_message(chat_message);
        }

        self.push_message(ChatMessage::system("📂 Session loaded successfully!"));
        Ok(())
    }

    pub async fn list_sessions(&self) -> GatewayResult<Vec<SessionSummary>> {
        self.backend.list_sessions().await
    }

    /// Exports the active session's transcript; gated on an active session.
    pub async fn export_transcript(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let Some(session_id) = self.session.id() else {
            return NoActiveSessionSnafu { stage: "export" }.fail();
        };

        self.backend
            .export_session(session_id.as_str(), format)
            .await
            .map_err(|source| ExportError::Backend {
                stage: "export",
                source,
            })
    }

    /// Fires an opaque media generation job and surfaces the artifact URL
    /// as an assistant message.
    pub async fn generate_media(&mut self, job: MediaJob) -> GatewayResult<MediaArtifact> {
        let artifact = self.backend.request_media(job).await?;
        self.push_message(ChatMessage::assistant(MessageBody::plain(
            artifact.url.clone(),
        )));
        Ok(artifact)
    }

    /// Enhances, post-processes, appends, and renders one message.
    fn push_message(&mut self, message: ChatMessage) -> Document {
        let mut document = enhance(&message.body, message.role);
        post_process_tables(&mut document);
        post_process_code_blocks(&mut document);

        self.viewport.message_appended(&message, &document);
        self.transcript.push(message);
        document
    }
}
