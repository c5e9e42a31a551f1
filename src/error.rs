//! Error taxonomy shared by the simulation engines.
//!
//! Engines fail fast with a [`SolverError`] and never return partial results.
//! A Newton solve that runs out of iterations is not an error: the result
//! reports `converged == false` and the caller decides what residual is
//! acceptable.

use thiserror::Error;

/// Errors raised by the simulation engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Malformed or out-of-domain input, or a numerical breakdown traced back
    /// to one of the inputs.
    #[error("invalid input `{parameter}`: {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// A derived size (step count, grid size, frame storage) exceeds the
    /// configured ceiling.
    #[error("resource limit exceeded for {what}: requested {requested}, limit {limit}")]
    ResourceLimit {
        what: String,
        requested: u64,
        limit: u64,
    },

    /// A cooperative cancellation request was observed between timesteps.
    #[error("solve cancelled after {step} steps")]
    Cancelled { step: usize },
}

impl SolverError {
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn resource(what: impl Into<String>, requested: u64, limit: u64) -> Self {
        Self::ResourceLimit {
            what: what.into(),
            requested,
            limit,
        }
    }
}

pub type SolverResult<T> = std::result::Result<T, SolverError>;

/// Fails with [`SolverError::InvalidInput`] unless `value` is finite and > 0.
pub fn ensure_positive(parameter: &str, value: f64) -> SolverResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SolverError::invalid(
            parameter,
            format!("must be a finite value > 0, got {value}"),
        ))
    }
}

/// Fails with [`SolverError::InvalidInput`] unless `value` is finite.
pub fn ensure_finite(parameter: &str, value: f64) -> SolverResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SolverError::invalid(
            parameter,
            format!("must be finite, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_names_parameter() {
        let err = SolverError::invalid("ns", "must be >= 1");
        assert_eq!(err.to_string(), "invalid input `ns`: must be >= 1");
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("d", 1e-12).is_ok());
        assert!(ensure_positive("d", 0.0).is_err());
        assert!(ensure_positive("d", -1.0).is_err());
        assert!(ensure_positive("d", f64::NAN).is_err());
        assert!(ensure_positive("d", f64::INFINITY).is_err());
    }

    #[test]
    fn test_resource_limit_message() {
        let err = SolverError::resource("time steps", 200, 100);
        assert!(err.to_string().contains("requested 200, limit 100"));
    }
}
