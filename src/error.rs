use thiserror::Error;

/// Errors surfaced by the pipeline core.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Sink create/write/seek/close failure. Fatal to the active session.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or out-of-order producer traffic.
    #[error("Protocol violation: {message}")]
    Protocol { message: String },

    /// Operation invoked against the wrong session state.
    #[error("Invalid state: {message}")]
    State { message: String },
}

impl PipelineError {
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

/// Type alias for convenience
pub type Result<T> = std::result::Result<T, PipelineError>;
