//! Errors talking to the control server

use thiserror::Error;

/// Result type for remote registry calls
pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connection, timeout or body decoding failure
    #[error("control server request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body
    #[error("control server rejected request ({status}): {code}: {error}")]
    Rejected {
        status: u16,
        code: String,
        error: String,
    },

    /// The server answered with something this client cannot use
    #[error("unexpected response from control server: {0}")]
    Protocol(String),
}

impl RemoteError {
    pub fn code(&self) -> &'static str {
        match self {
            RemoteError::Http(_) => "FI_REMOTE_HTTP",
            RemoteError::Rejected { .. } => "FI_REMOTE_REJECTED",
            RemoteError::Protocol(_) => "FI_REMOTE_PROTOCOL",
        }
    }
}
