#![deny(unsafe_code)]

/// Backend transport trait, wire payloads, and the gateway error taxonomy.
pub mod backend;
/// Model gating and load-with-fallback policy.
pub mod gateway;
/// HTTP implementation of the backend transport.
pub mod http;
/// Model descriptors and the catalog with provenance.
pub mod model;

pub use backend::{
    AttachmentUpload, BoxFuture, ChatBackend, ChatReply, ChatRequest, ExportFormat, GatewayError,
    GatewayResult, MediaArtifact, MediaJob, MediaKind, SessionSummary, StoredMessage,
};
pub use gateway::ModelGateway;
pub use http::HttpChatBackend;
pub use model::{
    ModelCatalog, ModelCatalogSource, ModelDescriptor, SelectionRejection, fallback_models,
};
