// Copyright @yucwang 2026

use thiserror::Error;

/// Failures of the radiosity pipeline.
///
/// Every variant ends the current run; none of them is retried. The only
/// graceful path is CGS running out of iterations, which is reported through
/// the returned solution instead of an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RadiosityError {
    #[error("invalid argument in {context}: {message}")]
    InvalidArgument { context: &'static str, message: String },

    /// `iterations` counts the iterations completed before the breakdown.
    #[error("singular system in {context} after {iterations} iterations: {message}")]
    Singular { context: &'static str, message: String, iterations: usize },

    #[error("{context} did not converge after {iterations} iterations")]
    NotConverged { context: &'static str, iterations: usize },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("{function} argument {value} is outside its domain")]
    NumericDomain { function: &'static str, value: f64 },
}

pub type RadiosityResult<T> = Result<T, RadiosityError>;

impl RadiosityError {
    pub fn invalid_argument<T: ToString>(context: &'static str, message: T) -> Self {
        RadiosityError::InvalidArgument { context, message: message.to_string() }
    }

    pub fn singular<T: ToString>(context: &'static str, iterations: usize, message: T) -> Self {
        RadiosityError::Singular { context, message: message.to_string(), iterations }
    }

    /// Process exit status used by the command-line driver.
    pub fn exit_code(&self) -> i32 {
        match self {
            RadiosityError::InvalidArgument { .. } => 2,
            RadiosityError::Singular { .. } => 3,
            RadiosityError::NotConverged { .. } => 4,
            RadiosityError::InvariantViolation(_) => 5,
            RadiosityError::NumericDomain { .. } => 6,
        }
    }
}
