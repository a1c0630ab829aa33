use thiserror::Error;

pub type TridiumResult<T> = Result<T, TridiumError>;

#[derive(Error, Debug)]
pub enum TridiumError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TridiumError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<config::ConfigError> for TridiumError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
