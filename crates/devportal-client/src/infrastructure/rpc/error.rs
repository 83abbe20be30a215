//! Error type for developer server requests.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The server answered with a status the operation does not accept.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// No answer within the operation's timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection refused, DNS failure, malformed response.
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e)
        }
    }
}
