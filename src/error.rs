use crate::estimation::EstimationMethod;
use std::error::Error;
use std::fmt;

/// Error type shared by every distribution and engine in the crate.
///
/// Domain errors name the offending parameter so callers can correct the
/// input; capability gaps (`MethodNotSupported`) and optimizer failures
/// (`NonConvergence`) are distinct variants so callers can fall back to a
/// different estimation method instead of treating them as bad data.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// A parameter violates its declared domain (NaN, infinite, wrong sign,
    /// or an ordering constraint between co-dependent parameters).
    InvalidParameter {
        distribution: &'static str,
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A parameter vector of the wrong arity was supplied.
    ParameterCount {
        distribution: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A probability argument outside [0, 1] (or NaN).
    InvalidProbability { value: f64 },

    /// The (estimation method, distribution) pairing has no defined formula.
    MethodNotSupported {
        distribution: &'static str,
        method: EstimationMethod,
        operation: &'static str,
    },

    /// The optimizer or root finder stopped without meeting its tolerance.
    NonConvergence {
        operation: &'static str,
        iterations: usize,
    },

    /// The sample is too short for the requested estimator.
    SampleTooSmall { required: usize, actual: usize },
}

impl fmt::Display for DistributionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionError::InvalidParameter {
                distribution,
                parameter,
                value,
                reason,
            } => write!(
                f,
                "{distribution}: parameter '{parameter}' = {value} is invalid: {reason}"
            ),
            DistributionError::ParameterCount {
                distribution,
                expected,
                actual,
            } => write!(
                f,
                "{distribution}: expected {expected} parameters, got {actual}"
            ),
            DistributionError::InvalidProbability { value } => {
                write!(f, "probability {value} is outside [0, 1]")
            }
            DistributionError::MethodNotSupported {
                distribution,
                method,
                operation,
            } => write!(
                f,
                "{distribution}: {operation} is not defined for the {method} method"
            ),
            DistributionError::NonConvergence {
                operation,
                iterations,
            } => write!(f, "{operation} did not converge after {iterations} iterations"),
            DistributionError::SampleTooSmall { required, actual } => write!(
                f,
                "sample of length {actual} is too small (needs at least {required})"
            ),
        }
    }
}

impl Error for DistributionError {}
