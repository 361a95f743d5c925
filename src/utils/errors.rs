use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("No video was set for the player")]
    MissingVideo,

    #[error("No container was set for the player")]
    MissingContainer,

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("Settings storage error: {0}")]
    Storage(String),

    #[error("Extension context invalidated")]
    ContextInvalidated,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OverlayError {
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

pub type Result<T, E = OverlayError> = std::result::Result<T, E>;
