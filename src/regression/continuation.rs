// src/regression/continuation.rs
//! Continuation values by least-squares regression
//!
//! # Algorithm
//!
//! During the backward sweep, at each exercise date the discounted value of
//! holding the option is regressed onto a basis of the current state:
//! ```text
//! (XᵀX) β = Xᵀ y
//! ```
//! solved through a QR decomposition. The fitted `Xβ` is the (in-sample)
//! continuation estimate, and `β` is stored together with the column
//! standardization and knots used to build `X`.
//!
//! The forward pass rebuilds `X` on fresh paths with the stored transform and
//! evaluates `Xβ` without refitting, which keeps the replayed policy
//! non-anticipating.

use super::basis::{RegressionBasis, Standardization};
use super::knots::{compute_knots, hinge_functions};
use crate::error::{validation::*, PricingError, PricingResult};
use crate::mc::payoffs::PayoffEvaluator;
use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::sync::Arc;

/// Largest state dimension the regression engines accept
pub const MAX_STATE_DIMENSION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegressionMethod {
    /// Plain polynomial basis
    Longstaff,
    /// Polynomial basis plus the immediate payoff as a regressor
    ModifiedLongstaff,
    /// Polynomial basis plus one truncated power per empirical knot
    Carriere,
}

#[derive(Debug, Clone)]
pub struct RegressionConfig {
    pub method: RegressionMethod,
    pub degree: usize,
    pub dimension: usize,
    /// Only used by [`RegressionMethod::Carriere`]
    pub knots: usize,
}

impl RegressionConfig {
    pub fn validate(&self) -> PricingResult<()> {
        if self.dimension == 0 || self.dimension > MAX_STATE_DIMENSION {
            return Err(PricingError::UnsupportedDimension {
                dimension: self.dimension,
                max: MAX_STATE_DIMENSION,
            });
        }
        if self.degree == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "degree".to_string(),
                reason: "polynomial degree must be at least 1".to_string(),
            });
        }
        if self.method == RegressionMethod::Carriere && self.knots <= 2 {
            return Err(PricingError::InvalidKnotCount { knots: self.knots });
        }
        Ok(())
    }

    /// Build the configured engine; the payoff is only consumed by the modified variant
    pub fn build(
        &self,
        payoff: Arc<dyn PayoffEvaluator>,
    ) -> PricingResult<RegressionContinuation> {
        self.validate()?;
        match self.method {
            RegressionMethod::Longstaff => {
                RegressionContinuation::longstaff_schwartz(self.degree, self.dimension)
            }
            RegressionMethod::ModifiedLongstaff => RegressionContinuation::modified_longstaff_schwartz(
                payoff,
                self.degree,
                self.dimension,
            ),
            RegressionMethod::Carriere => {
                RegressionContinuation::carriere(self.degree, self.dimension, self.knots)
            }
        }
    }
}

impl Default for RegressionConfig {
    fn default() -> Self {
        RegressionConfig {
            method: RegressionMethod::Longstaff,
            degree: 3,
            dimension: 1,
            knots: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    Unfit,
    /// Backward sweep in progress
    Fitting,
    /// Backward sweep complete, ready for forward replay
    Fitted,
}

/// Fit/replay contract shared by all continuation estimators
pub trait ContinuationEngine: Send + Sync {
    /// Drop any previous policy and start a new backward sweep
    fn begin_backward_sweep(&mut self);

    /// Fit against `next_values` at the current date, store the fit, return in-sample values
    fn compute_continuation(
        &mut self,
        next_values: &Array1<f64>,
        states: &Array2<f64>,
    ) -> PricingResult<Array1<f64>>;

    fn finish_backward_sweep(&mut self);

    /// Evaluate stored fit number `fit_index` on `states` without refitting
    fn compute_continuation_forward_pass(
        &self,
        states: &Array2<f64>,
        fit_index: usize,
    ) -> PricingResult<Array1<f64>>;

    fn state(&self) -> FitState;

    fn fitted_count(&self) -> usize;
}

/// Everything needed to rebuild a design matrix and evaluate it
#[derive(Debug, Clone)]
pub struct FittedRegression {
    pub coefficients: DVector<f64>,
    pub standardization: Standardization,
    /// Knots in price units, empty unless the Carriere basis is used
    pub knots: Vec<f64>,
}

/// Fits in backward-sweep order: index 0 is the second-to-last exercise date
#[derive(Debug, Clone, Default)]
pub struct CoefficientHistory {
    fits: Vec<FittedRegression>,
}

impl CoefficientHistory {
    pub fn push(&mut self, fit: FittedRegression) {
        self.fits.push(fit);
    }

    pub fn get(&self, fit_index: usize) -> Option<&FittedRegression> {
        self.fits.get(fit_index)
    }

    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    pub fn clear(&mut self) {
        self.fits.clear();
    }

    /// Fit index for forward date `date_index` of an `num_dates` schedule.
    ///
    /// The backward sweep fits dates `N-2, N-3, ..., 0`, so date `i` maps to
    /// `N - 2 - i`. The last date has no fit.
    pub fn fit_index_for_date(date_index: usize, num_dates: usize) -> Option<usize> {
        if date_index + 1 < num_dates {
            Some(num_dates - 2 - date_index)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regressors {
    Polynomial,
    Knots(usize),
}

/// Regression continuation engine (Longstaff-Schwartz, modified LS, Carriere)
#[derive(Debug, Clone)]
pub struct RegressionContinuation {
    basis: RegressionBasis,
    regressors: Regressors,
    history: CoefficientHistory,
    state: FitState,
}

/// Solve `(XᵀX) β = Xᵀy` by QR; `None` when the system is singular
pub fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let xtx = x.tr_mul(x);
    let xty = x.tr_mul(y);
    let beta = xtx.qr().solve(&xty)?;
    if beta.iter().all(|b| b.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

fn check_dimension(dimension: usize) -> PricingResult<()> {
    if dimension == 0 || dimension > MAX_STATE_DIMENSION {
        Err(PricingError::UnsupportedDimension {
            dimension,
            max: MAX_STATE_DIMENSION,
        })
    } else {
        Ok(())
    }
}

fn to_array(v: &DVector<f64>) -> Array1<f64> {
    Array1::from(v.iter().copied().collect::<Vec<f64>>())
}

impl RegressionContinuation {
    pub fn longstaff_schwartz(degree: usize, dimension: usize) -> PricingResult<Self> {
        check_dimension(dimension)?;
        Ok(Self {
            basis: RegressionBasis::new(degree, dimension)?,
            regressors: Regressors::Polynomial,
            history: CoefficientHistory::default(),
            state: FitState::Unfit,
        })
    }

    pub fn modified_longstaff_schwartz(
        payoff: Arc<dyn PayoffEvaluator>,
        degree: usize,
        dimension: usize,
    ) -> PricingResult<Self> {
        let mut engine = Self::longstaff_schwartz(degree, dimension)?;
        engine.basis.extend_with_payoff(payoff)?;
        Ok(engine)
    }

    pub fn carriere(degree: usize, dimension: usize, knots: usize) -> PricingResult<Self> {
        if knots <= 2 {
            return Err(PricingError::InvalidKnotCount { knots });
        }
        let mut engine = Self::longstaff_schwartz(degree, dimension)?;
        engine.regressors = Regressors::Knots(knots);
        Ok(engine)
    }

    pub fn basis(&self) -> &RegressionBasis {
        &self.basis
    }

    pub fn history(&self) -> &CoefficientHistory {
        &self.history
    }

    fn design_matrix(
        &self,
        states: &Array2<f64>,
        standardization: &Standardization,
        knots: &[f64],
    ) -> PricingResult<DMatrix<f64>> {
        if knots.is_empty() {
            self.basis.evaluate(states, standardization)
        } else {
            let hinges = hinge_functions(knots, self.basis.degree(), standardization);
            self.basis.evaluate_with(states, standardization, &hinges)
        }
    }
}

impl ContinuationEngine for RegressionContinuation {
    fn begin_backward_sweep(&mut self) {
        self.history.clear();
        self.state = FitState::Fitting;
    }

    fn compute_continuation(
        &mut self,
        next_values: &Array1<f64>,
        states: &Array2<f64>,
    ) -> PricingResult<Array1<f64>> {
        validate_same_len("continuation targets", states.nrows(), next_values.len())?;
        if self.state != FitState::Fitting {
            self.begin_backward_sweep();
        }

        let standardization = Standardization::fit(states);
        let knots = match self.regressors {
            Regressors::Polynomial => Vec::new(),
            Regressors::Knots(k) => {
                let first: Vec<f64> = states.column(0).to_vec();
                compute_knots(k, &first)?
            }
        };

        let x = self.design_matrix(states, &standardization, &knots)?;
        let y = DVector::from_iterator(next_values.len(), next_values.iter().copied());
        let fit_index = self.history.len();
        let coefficients =
            least_squares(&x, &y).ok_or(PricingError::SingularRegression {
                fit_index,
                basis_size: x.ncols(),
            })?;

        let fitted = &x * &coefficients;
        debug!(
            "continuation fit {}: {} paths, {} regressors",
            fit_index,
            x.nrows(),
            x.ncols()
        );

        self.history.push(FittedRegression {
            coefficients,
            standardization,
            knots,
        });
        Ok(to_array(&fitted))
    }

    fn finish_backward_sweep(&mut self) {
        self.state = FitState::Fitted;
    }

    fn compute_continuation_forward_pass(
        &self,
        states: &Array2<f64>,
        fit_index: usize,
    ) -> PricingResult<Array1<f64>> {
        let fit = self
            .history
            .get(fit_index)
            .ok_or_else(|| PricingError::PolicyNotFitted {
                reason: format!(
                    "no regression stored at backward step {} ({} available)",
                    fit_index,
                    self.history.len()
                ),
            })?;

        let x = self.design_matrix(states, &fit.standardization, &fit.knots)?;
        validate_same_len("stored coefficients", x.ncols(), fit.coefficients.len())?;
        Ok(to_array(&(&x * &fit.coefficients)))
    }

    fn state(&self) -> FitState {
        self.state
    }

    fn fitted_count(&self) -> usize {
        self.history.len()
    }
}
