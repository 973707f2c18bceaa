/// Domain entities for chat messages and attachments.
pub mod message;
/// Submission pipeline and state ownership.
pub mod orchestrator;
/// Transcript and split response panes.
pub mod pane;
/// Unified/split view-state machine.
pub mod view_state;

pub use message::{ChatMessage, FileAttachment, ResponseId, Role, SubmissionSeq};
pub use orchestrator::{ChatOrchestrator, SubmitError};
pub use pane::{RenderedResponse, SplitPane, Transcript};
pub use view_state::{ViewEffect, ViewState, ViewStateMachine};
