use thiserror::Error;


#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Dataset stream failed: {0}")]
    StreamFailure(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Index not ready: {0}")]
    IndexNotReady(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn stream(message: impl Into<String>) -> Self {
        Self::StreamFailure(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }


    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StreamFailure(_) | Self::Io(_))
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            Self::MalformedRecord(err.to_string())
        } else {
            Self::StreamFailure(err.to_string())
        }
    }
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, CatalogError>;
