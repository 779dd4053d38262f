// src/regression/basis.rs
//! Polynomial regression basis over the state vector
//!
//! For degree `d` and state dimension `k` the basis is, in order:
//! 1. the constant `1`
//! 2. pure powers `x_i^e` for `e = 1..=d`, `i = 1..=k`
//! 3. cross terms `x_i^e1 · x_j^e2` with `i > j`, `e1, e2 ≥ 1`, `e1 + e2 ≤ d`
//!
//! Polynomial and hinge terms see the state after per-column standardization
//! (see [`Standardization`]); payoff regressors see the raw prices.

use crate::error::{validation::*, PricingError, PricingResult};
use crate::mc::payoffs::PayoffEvaluator;
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView1, Axis};
use rayon::prelude::*;
use std::sync::Arc;

/// One regressor of the design matrix
#[derive(Debug, Clone)]
pub enum BasisFunction {
    Constant,
    Power {
        index: usize,
        exponent: i32,
    },
    Cross {
        first: usize,
        first_exponent: i32,
        second: usize,
        second_exponent: i32,
    },
    /// Truncated power `max(x_0 - knot, 0)^exponent` on the standardized first coordinate
    Hinge { knot: f64, exponent: i32 },
    /// Immediate exercise value of the contract
    Payoff(Arc<dyn PayoffEvaluator>),
}

impl BasisFunction {
    pub fn value(&self, standardized: &[f64], raw: ArrayView1<f64>) -> f64 {
        match self {
            BasisFunction::Constant => 1.0,
            BasisFunction::Power { index, exponent } => standardized[*index].powi(*exponent),
            BasisFunction::Cross {
                first,
                first_exponent,
                second,
                second_exponent,
            } => {
                standardized[*first].powi(*first_exponent)
                    * standardized[*second].powi(*second_exponent)
            }
            BasisFunction::Hinge { knot, exponent } => {
                (standardized[0] - knot).max(0.0).powi(*exponent)
            }
            BasisFunction::Payoff(payoff) => payoff.payoff(raw),
        }
    }
}

/// Per-column affine map `z = (x - mean) / scale`.
///
/// Columns whose standard deviation is zero up to rounding are only centered.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardization {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardization {
    pub fn identity(dimension: usize) -> Self {
        Self {
            means: vec![0.0; dimension],
            scales: vec![1.0; dimension],
        }
    }

    /// Column means and sample standard deviations of `states`
    pub fn fit(states: &Array2<f64>) -> Self {
        let n = states.nrows();
        let means = match states.mean_axis(Axis(0)) {
            Some(means) => means,
            None => return Self::identity(states.ncols()),
        };
        let ddof = if n > 1 { 1.0 } else { 0.0 };
        let stds = states.std_axis(Axis(0), ddof);

        let scales = means
            .iter()
            .zip(stds.iter())
            .map(|(&m, &s)| {
                if s <= f64::EPSILON * m.abs().max(1.0) {
                    1.0
                } else {
                    s
                }
            })
            .collect();

        Self {
            means: means.to_vec(),
            scales,
        }
    }

    pub fn dimension(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    #[inline]
    pub fn transform(&self, index: usize, x: f64) -> f64 {
        (x - self.means[index]) / self.scales[index]
    }

    pub fn apply(&self, row: ArrayView1<f64>) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(i, &x)| self.transform(i, x))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RegressionBasis {
    functions: Vec<BasisFunction>,
    degree: usize,
    dimension: usize,
    payoff_augmented: bool,
}

impl RegressionBasis {
    pub fn new(degree: usize, dimension: usize) -> PricingResult<Self> {
        if degree == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "degree".to_string(),
                reason: "polynomial degree must be at least 1".to_string(),
            });
        }
        if dimension == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "dimension".to_string(),
                reason: "state dimension must be at least 1".to_string(),
            });
        }

        let mut functions = vec![BasisFunction::Constant];

        for exponent in 1..=degree as i32 {
            for index in 0..dimension {
                functions.push(BasisFunction::Power { index, exponent });
            }
        }

        for total in 2..=degree as i32 {
            for first_exponent in 1..total {
                for first in 0..dimension {
                    for second in 0..first {
                        functions.push(BasisFunction::Cross {
                            first,
                            first_exponent,
                            second,
                            second_exponent: total - first_exponent,
                        });
                    }
                }
            }
        }

        Ok(Self {
            functions,
            degree,
            dimension,
            payoff_augmented: false,
        })
    }

    /// Append the immediate exercise value as an extra regressor. Allowed once.
    pub fn extend_with_payoff(&mut self, payoff: Arc<dyn PayoffEvaluator>) -> PricingResult<()> {
        if self.payoff_augmented {
            return Err(PricingError::InvalidConfiguration {
                field: "basis".to_string(),
                reason: "payoff regressor already added".to_string(),
            });
        }
        if let Some(assets) = payoff.num_assets() {
            validate_same_len("payoff regressor assets", self.dimension, assets)?;
        }
        self.functions.push(BasisFunction::Payoff(payoff));
        self.payoff_augmented = true;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn functions(&self) -> &[BasisFunction] {
        &self.functions
    }

    pub fn is_payoff_augmented(&self) -> bool {
        self.payoff_augmented
    }

    /// `(paths × len())` design matrix
    pub fn evaluate(
        &self,
        states: &Array2<f64>,
        standardization: &Standardization,
    ) -> PricingResult<DMatrix<f64>> {
        self.evaluate_with(states, standardization, &[])
    }

    /// Design matrix with `extra` regressors appended after the basis functions
    pub fn evaluate_with(
        &self,
        states: &Array2<f64>,
        standardization: &Standardization,
        extra: &[BasisFunction],
    ) -> PricingResult<DMatrix<f64>> {
        validate_same_len("regression state columns", self.dimension, states.ncols())?;
        validate_same_len(
            "standardization columns",
            self.dimension,
            standardization.dimension(),
        )?;

        let n = states.nrows();
        let width = self.functions.len() + extra.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|p| {
                let raw = states.row(p);
                let z = standardization.apply(raw);
                self.functions
                    .iter()
                    .chain(extra)
                    .map(|f| f.value(&z, raw))
                    .collect()
            })
            .collect();

        Ok(DMatrix::from_fn(n, width, |i, j| rows[i][j]))
    }
}
