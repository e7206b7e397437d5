use thiserror::Error;

/// Errors raised by the epidemic engine.
///
/// Only configuration can fail: once a config has been accepted the
/// simulation loop always runs to completion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid simulation configuration: {0}")]
    InvalidConfiguration(String),
}

pub type SimResult<T> = Result<T, SimError>;
