#![deny(unsafe_code)]

/// Application bootstrap wiring.
pub mod app;
/// Chat domain model and orchestration.
pub mod chat;
/// Configuration persistence.
pub mod config;
/// Active-session context.
pub mod session;
/// Rendering-capability seam injected into the orchestrator.
pub mod viewport;

pub use app::bootstrap;
pub use chat::orchestrator::{ChatOrchestrator, SubmitError};
pub use chat::view_state::{ViewEffect, ViewState, ViewStateMachine};
pub use config::{AppConfig, ConfigStore};
pub use session::{SessionContext, SessionId};
pub use viewport::ViewPort;
