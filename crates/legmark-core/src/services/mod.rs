//! Interfaces to the hosted services around reconstruction: the bill source
//! that supplies PDFs, and the optical recognition, amendment merging and
//! question answering services that consume markdown.
//!
//! Only the contracts, prompts, validation and retry behaviour live here.
//! Network clients implement the traits elsewhere.

pub mod amend;
pub mod ocr;
pub mod qa;
pub mod questions;
pub mod retry;
pub mod source;

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// Connection drops, 5xx responses, rate limits.
    #[error("transient service error: {0}")]
    Transient(String),

    /// The service answered but the payload could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Authentication failures, invalid requests; retrying cannot help.
    #[error("service error: {0}")]
    Fatal(String),
}

impl CollaboratorError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Transient(_) | CollaboratorError::Malformed(_)
        )
    }
}
