use sypha_content::Document;
use sypha_gateway::ModelDescriptor;

use crate::chat::message::ChatMessage;
use crate::chat::pane::RenderedResponse;
use crate::chat::view_state::ViewState;

/// Rendering-capability surface injected into the orchestrator.
///
/// The orchestrator drives presentation exclusively through this trait,
/// which keeps it headless-testable and the concrete surface swappable.
pub trait ViewPort {
    /// A message was appended to the chat pane, with its enhanced content.
    fn message_appended(&mut self, message: &ChatMessage, rendered: &Document);

    /// The split pane's displayed response was replaced.
    fn response_replaced(&mut self, response: &RenderedResponse);

    /// Unified/split arrangement changed.
    fn view_changed(&mut self, state: ViewState);

    /// Submit affordance toggled for the single-flight window.
    fn sending_changed(&mut self, sending: bool);

    /// Composer text set programmatically (cleared on issue, restored on
    /// failure for retry).
    fn input_text_changed(&mut self, text: &str);

    /// Attachment preview cleared.
    fn attachment_cleared(&mut self);

    /// Chat pane emptied (new session, clear, session switch).
    fn transcript_cleared(&mut self);

    /// Keyboard focus returned to the composer.
    fn focus_input(&mut self);

    /// Model options or the active selection changed.
    fn model_options_changed(&mut self, models: &[ModelDescriptor], selected: &str);

    /// Export affordance availability follows the active session.
    fn export_enabled_changed(&mut self, enabled: bool);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// What the orchestrator asked the surface to do, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Rendered {
        Message { role: crate::chat::Role, html: String },
        Response { html: String },
        View(ViewState),
        Sending(bool),
        InputText(String),
        AttachmentCleared,
        TranscriptCleared,
        FocusInput,
        ModelOptions { selected: String },
        ExportEnabled(bool),
    }

    /// Recording fake for orchestrator tests.
    #[derive(Debug, Default)]
    pub struct RecordingViewPort {
        pub calls: Vec<Rendered>,
    }

    impl RecordingViewPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn last_sending(&self) -> Option<bool> {
            self.calls.iter().rev().find_map(|call| match call {
                Rendered::Sending(sending) => Some(*sending),
                _ => None,
            })
        }

        pub fn last_input_text(&self) -> Option<&str> {
            self.calls.iter().rev().find_map(|call| match call {
                Rendered::InputText(text) => Some(text.as_str()),
                _ => None,
            })
        }

        pub fn message_roles(&self) -> Vec<crate::chat::Role> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Rendered::Message { role, .. } => Some(*role),
                    _ => None,
                })
                .collect()
        }
    }

    impl ViewPort for RecordingViewPort {
        fn message_appended(&mut self, message: &ChatMessage, rendered: &Document) {
            self.calls.push(Rendered::Message {
                role: message.role,
                html: sypha_content::render_html(rendered),
            });
        }

        fn response_replaced(&mut self, response: &RenderedResponse) {
            self.calls.push(Rendered::Response {
                html: sypha_content::render_html(&response.document),
            });
        }

        fn view_changed(&mut self, state: ViewState) {
            self.calls.push(Rendered::View(state));
        }

        fn sending_changed(&mut self, sending: bool) {
            self.calls.push(Rendered::Sending(sending));
        }

        fn input_text_changed(&mut self, text: &str) {
            self.calls.push(Rendered::InputText(text.to_string()));
        }

        fn attachment_cleared(&mut self) {
            self.calls.push(Rendered::AttachmentCleared);
        }

        fn transcript_cleared(&mut self) {
            self.calls.push(Rendered::TranscriptCleared);
        }

        fn focus_input(&mut self) {
            self.calls.push(Rendered::FocusInput);
        }

        fn model_options_changed(&mut self, _models: &[ModelDescriptor], selected: &str) {
            self.calls.push(Rendered::ModelOptions {
                selected: selected.to_string(),
            });
        }

        fn export_enabled_changed(&mut self, enabled: bool) {
            self.calls.push(Rendered::ExportEnabled(enabled));
        }
    }
}
