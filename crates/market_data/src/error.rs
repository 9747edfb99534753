use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !(e.is_builder() || e.is_decode() || e.is_redirect()),
            Self::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            Self::Decode(_) => false,
            Self::Transport(_) => true,
        }
    }
}
