#![deny(unsafe_code)]

/// File classification taxonomy for attachments.
pub mod files;
/// Structured content tree consumed by renderers.
pub mod node;
/// Raw-text to content-tree enhancement.
pub mod pipeline;
/// Table and code-block post-processing.
pub mod postprocess;
/// HTML serialization of the content tree.
pub mod render;

pub use files::{FileClass, FileKind, MAX_ATTACHMENT_BYTES, classify_file};
pub use node::{Block, Document, Inline, TableNode};
pub use pipeline::{MessageBody, Role, enhance};
pub use postprocess::{
    CodeViewer, CopyRequest, DismissPath, TableEvent, TableInteraction, post_process_code_blocks,
    post_process_tables,
};
pub use render::render_html;
