use thiserror::Error;

/// Common error types for Onionet services
#[derive(Debug, Error)]
pub enum OnionetError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for Onionet operations
pub type Result<T> = std::result::Result<T, OnionetError>;

impl OnionetError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
