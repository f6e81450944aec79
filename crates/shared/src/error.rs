use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("invalid page url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("element is not a {expected}")]
    WrongElementKind { expected: &'static str },
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("invalid page fixture: {0}")]
    Fixture(String),
    #[error("host operation '{operation}' failed: {message}")]
    Host {
        operation: &'static str,
        message: String,
    },
}

impl StorefrontError {
    pub fn host(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Host {
            operation,
            message: message.into(),
        }
    }
}
