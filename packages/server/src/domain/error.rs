//! Domain errors.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message id must not be empty")]
    EmptyMessageId,
}

/// Storage collaborator errors
///
/// Always contained at the call site: logged, never propagated to other
/// connections or the tag-sync scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached (connect, timeout, TLS).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a non-success status.
    #[error("storage rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// A stored document or response body could not be decoded.
    #[error("failed to decode stored document: {0}")]
    Decode(String),
}

/// Outbound send errors
///
/// Any of these means the connection is treated as dead and is unregistered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("connection closed")]
    Closed,

    #[error("failed to encode frame: {0}")]
    Encode(String),

    #[error("failed to write frame: {0}")]
    Write(String),

    /// The connection's history replay did not finish in time.
    #[error("history replay did not finish in time")]
    ReplayTimeout,
}
