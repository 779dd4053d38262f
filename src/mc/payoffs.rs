//! Option Payoff Functions
//!
//! # Mathematical Definitions
//!
//! Payoffs are evaluated on the asset prices of one exercise date.
//!
//! ## Single-asset
//! - **Call**: max(S - K, 0)
//! - **Put**: max(K - S, 0)
//!
//! ## Multi-asset
//! - **Best-of call**: max(max_i S_i - K, 0)
//! - **Worst-of put**: max(K - min_i S_i, 0)
//! - **Geometric call / put**: on G = (∏ S_i)^(1/n)
//!
//! # Implementation Notes
//!
//! The pricing engine only relies on the [`PayoffEvaluator`] capability, so any
//! pure function of a price row can be plugged in.

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use std::fmt;

/// Maps the asset prices of one date to a non-negative payoff, one row per path
pub trait PayoffEvaluator: Send + Sync + fmt::Debug {
    /// Asset count the payoff is defined for, `None` when any count works
    fn num_assets(&self) -> Option<usize>;

    /// Payoff for a single path
    fn payoff(&self, prices: ArrayView1<f64>) -> f64;

    /// Payoffs for every row of a `(paths × assets)` table, evaluated in parallel
    fn evaluate(&self, states: &Array2<f64>) -> Array1<f64> {
        let values: Vec<f64> = (0..states.nrows())
            .into_par_iter()
            .map(|p| self.payoff(states.row(p)))
            .collect();
        Array1::from(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Call,
    Put,
    BestOfCall,
    WorstOfPut,
    GeometricCall,
    GeometricPut,
}

impl OptionType {
    pub fn is_single_asset(&self) -> bool {
        matches!(self, OptionType::Call | OptionType::Put)
    }
}

/// Vanilla and basket payoffs with a fixed strike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payoff {
    pub option_type: OptionType,
    pub strike: f64,
}

impl Payoff {
    pub fn new(option_type: OptionType, strike: f64) -> Self {
        Payoff {
            option_type,
            strike,
        }
    }
}

fn geometric_mean(prices: &ArrayView1<f64>) -> f64 {
    let n = prices.len() as f64;
    (prices.iter().map(|s| s.ln()).sum::<f64>() / n).exp()
}

impl PayoffEvaluator for Payoff {
    fn num_assets(&self) -> Option<usize> {
        if self.option_type.is_single_asset() {
            Some(1)
        } else {
            None
        }
    }

    fn payoff(&self, prices: ArrayView1<f64>) -> f64 {
        let k = self.strike;
        match self.option_type {
            OptionType::Call => (prices[0] - k).max(0.0),
            OptionType::Put => (k - prices[0]).max(0.0),
            OptionType::BestOfCall => {
                let best = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (best - k).max(0.0)
            }
            OptionType::WorstOfPut => {
                let worst = prices.iter().copied().fold(f64::INFINITY, f64::min);
                (k - worst).max(0.0)
            }
            OptionType::GeometricCall => (geometric_mean(&prices) - k).max(0.0),
            OptionType::GeometricPut => (k - geometric_mean(&prices)).max(0.0),
        }
    }
}
