use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The messaging API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Network-level failure before any upstream status was seen.
    #[error("transport error: {0}")]
    Transport(String),

    /// Image refs were configured but none could be resolved to bytes.
    #[error("no usable attachment among {count} reference(s)")]
    NoUsableAttachment { count: usize },
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
