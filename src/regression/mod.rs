//! Regression bases and continuation-value engines

pub mod basis;
pub mod continuation;
pub mod knots;

pub use basis::{BasisFunction, RegressionBasis, Standardization};
pub use continuation::{
    least_squares, CoefficientHistory, ContinuationEngine, FitState, FittedRegression,
    RegressionConfig, RegressionContinuation, RegressionMethod, MAX_STATE_DIMENSION,
};
pub use knots::compute_knots;
