//! Report business logic: reconciliation, rendering and publishing.

pub mod comment;
pub mod document;
pub mod pdf;
pub mod permalink;
pub mod pipeline;
pub mod publish;
pub mod reconciliation;
pub mod storage;
