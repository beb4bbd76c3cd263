//! Structured error types for the proposal engine.
//!
//! Every failure here degrades to "operation did not complete, retry";
//! nothing in the core crashes an editing session. Input-boundary problems
//! (bad numeric text, wrong file type) are corrected or rejected at entry
//! and mostly never become errors at all; these variants cover the I/O and
//! entitlement paths.

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum ProposalError {
    /// An attached file is not a decodable raster image.
    #[error("invalid logo image: {0}")]
    InvalidLogo(String),

    /// A store call failed (network, server, or malformed response).
    #[error("store error: {0}")]
    Store(String),

    /// A record arrived from the store in a shape the model cannot accept.
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] serde_json::Error),

    /// No record matched the requested id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation requires a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The operation is gated behind an active subscription. An expected
    /// business condition, surfaced as an upgrade prompt by callers.
    #[error("an active subscription is required for this operation")]
    SubscriptionRequired,

    /// The HTML preview template failed to render.
    #[error("preview render error: {0}")]
    Template(#[from] tera::Error),
}

impl From<reqwest::Error> for ProposalError {
    fn from(e: reqwest::Error) -> Self {
        ProposalError::Store(e.to_string())
    }
}
