use val_api::transport::TransportError;

use crate::router::RouterError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// Only the string-carrying variants take the context; others are
    /// returned unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            EngineError::UnknownSchema(msg) => EngineError::UnknownSchema(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
