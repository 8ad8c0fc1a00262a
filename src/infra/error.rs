use thiserror::Error;

/// Failures raised by infrastructure adapters: startup wiring, persistence
/// plumbing, and filesystem access.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("database unavailable: {0}")]
    Database(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("could not install telemetry: {0}")]
    Telemetry(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
