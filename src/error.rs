// src/error.rs
use std::fmt;

/// Error types for the fast-lsm library
#[derive(Debug, Clone)]
pub enum PricingError {
    /// Invalid parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration
    InvalidConfiguration { field: String, reason: String },

    /// Regression engines only handle one or two state variables
    UnsupportedDimension { dimension: usize, max: usize },

    /// Carriere knot placement needs at least three knots
    InvalidKnotCount { knots: usize },

    /// The normal equations of a regression could not be solved
    SingularRegression { fit_index: usize, basis_size: usize },

    /// Numerical instability or non-finite results
    NumericalInstability { method: String, reason: String },

    /// Paths, assets or dates disagree between collaborators
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Forward replay requested without a matching backward sweep
    PolicyNotFitted { reason: String },
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            PricingError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            PricingError::UnsupportedDimension { dimension, max } => {
                write!(
                    f,
                    "Unsupported state dimension {}: regression supports at most {}",
                    dimension, max
                )
            }
            PricingError::InvalidKnotCount { knots } => {
                write!(
                    f,
                    "Invalid knot count {}: non-parametric regression needs more than 2 knots",
                    knots
                )
            }
            PricingError::SingularRegression {
                fit_index,
                basis_size,
            } => {
                write!(
                    f,
                    "Singular regression system at backward step {} ({} regressors)",
                    fit_index, basis_size
                )
            }
            PricingError::NumericalInstability { method, reason } => {
                write!(f, "Numerical instability in {}: {}", method, reason)
            }
            PricingError::DimensionMismatch {
                context,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Dimension mismatch in {}: expected {}, found {}",
                    context, expected, found
                )
            }
            PricingError::PolicyNotFitted { reason } => {
                write!(f, "Exercise policy not fitted: {}", reason)
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Result type alias for fast-lsm operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricingError, PricingResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> PricingResult<()> {
        if !(value > 0.0) {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> PricingResult<()> {
        if !(value >= 0.0) {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> PricingResult<()> {
        if !(value >= min && value <= max) {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate correlation parameter
    pub fn validate_correlation(name: &str, rho: f64) -> PricingResult<()> {
        validate_range(name, rho, -1.0, 1.0)
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricingResult<()> {
        if !value.is_finite() {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> PricingResult<()> {
        if paths == 0 {
            Err(PricingError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if paths > 100_000_000 {
            Err(PricingError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "exceeds maximum allowed (100 million)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that two collaborator dimensions agree
    pub fn validate_same_len(context: &str, expected: usize, found: usize) -> PricingResult<()> {
        if expected != found {
            Err(PricingError::DimensionMismatch {
                context: context.to_string(),
                expected,
                found,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("s0", 11.0).is_ok());
        assert!(validate_positive("s0", 0.0).is_err());
        assert!(validate_positive("s0", -0.1).is_err());
        assert!(validate_positive("s0", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_non_negative_allows_zero_volatility() {
        assert!(validate_non_negative("sigma", 0.0).is_ok());
        assert!(validate_non_negative("sigma", -1e-9).is_err());
    }

    #[test]
    fn test_validate_correlation() {
        assert!(validate_correlation("rho", 0.5).is_ok());
        assert!(validate_correlation("rho", 1.0).is_ok());
        assert!(validate_correlation("rho", -1.0).is_ok());
        assert!(validate_correlation("rho", 1.1).is_err());
        assert!(validate_correlation("rho", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_same_len() {
        assert!(validate_same_len("payoff", 4, 4).is_ok());
        match validate_same_len("payoff", 4, 3) {
            Err(PricingError::DimensionMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, 4);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let error = PricingError::InvalidParameters {
            parameter: "sigma".to_string(),
            value: -0.1,
            constraint: "must be non-negative".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("sigma"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("non-negative"));
    }

    #[test]
    fn test_unsupported_dimension_display() {
        let display = format!(
            "{}",
            PricingError::UnsupportedDimension {
                dimension: 3,
                max: 2
            }
        );
        assert!(display.contains('3'));
        assert!(display.contains("at most 2"));
    }
}
