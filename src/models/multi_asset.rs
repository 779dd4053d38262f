// src/models/multi_asset.rs
//! Correlated multi-asset lognormal diffusion
//!
//! # Mathematical Framework
//!
//! ```text
//! S_i(t) = S_i(0) * exp((r - q_i - σ_i²/2) t + W_i(t))
//! ```
//! where `W(t)` is a Brownian motion with covariance `diag(σ)·C·diag(σ)·t`.
//!
//! Increments are built per path and per date as `√Δt · L · Z`, with `L` the
//! matrix square root of the covariance computed once at construction, and
//! accumulated across dates.

use super::model::{DiffusionModel, ExerciseSchedule, PathSet};
use crate::error::{validation::*, PricingError, PricingResult};
use crate::math_utils::matrix_square_root;
use crate::rng::{self, DEFAULT_SEED};
use ndarray::{Array1, Array2};
use rand::RngCore;

#[derive(Debug, Clone)]
pub struct BlackScholesMulti {
    s0: Array1<f64>,
    r: f64,
    sigmas: Array1<f64>,
    dividends: Array1<f64>,
    correlation: Array2<f64>,
    cholesky: Array2<f64>,
    seed: u64,
}

impl BlackScholesMulti {
    pub fn new(
        s0: Vec<f64>,
        r: f64,
        sigmas: Vec<f64>,
        dividends: Vec<f64>,
        correlation: Array2<f64>,
    ) -> PricingResult<Self> {
        Self::with_seed(s0, r, sigmas, dividends, correlation, DEFAULT_SEED)
    }

    pub fn with_seed(
        s0: Vec<f64>,
        r: f64,
        sigmas: Vec<f64>,
        dividends: Vec<f64>,
        correlation: Array2<f64>,
        seed: u64,
    ) -> PricingResult<Self> {
        let dim = s0.len();
        if dim == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "s0".to_string(),
                reason: "at least one asset is required".to_string(),
            });
        }
        validate_same_len("volatilities", dim, sigmas.len())?;
        validate_same_len("dividends", dim, dividends.len())?;
        validate_same_len("correlation rows", dim, correlation.nrows())?;
        validate_same_len("correlation columns", dim, correlation.ncols())?;
        validate_finite("r", r)?;
        for i in 0..dim {
            validate_positive("s0", s0[i])?;
            validate_non_negative("sigma", sigmas[i])?;
            validate_finite("sigma", sigmas[i])?;
            validate_finite("q", dividends[i])?;
            for j in 0..dim {
                validate_correlation("rho", correlation[[i, j]])?;
                if (correlation[[i, j]] - correlation[[j, i]]).abs() > 1e-12 {
                    return Err(PricingError::InvalidConfiguration {
                        field: "correlation".to_string(),
                        reason: format!("matrix is not symmetric at ({}, {})", i, j),
                    });
                }
            }
        }

        let covariance =
            Array2::from_shape_fn((dim, dim), |(i, j)| sigmas[i] * correlation[[i, j]] * sigmas[j]);
        let cholesky = matrix_square_root(&covariance)?;

        Ok(Self {
            s0: Array1::from(s0),
            r,
            sigmas: Array1::from(sigmas),
            dividends: Array1::from(dividends),
            correlation,
            cholesky,
            seed,
        })
    }

    pub fn correlation(&self) -> &Array2<f64> {
        &self.correlation
    }

    /// Lower-triangular factor applied to independent normals
    pub fn cholesky(&self) -> &Array2<f64> {
        &self.cholesky
    }

    fn drift(&self, t: f64) -> Array1<f64> {
        Array1::from_shape_fn(self.s0.len(), |i| {
            (self.r - self.dividends[i] - 0.5 * self.sigmas[i] * self.sigmas[i]) * t
        })
    }
}

impl DiffusionModel for BlackScholesMulti {
    fn dimension(&self) -> usize {
        self.s0.len()
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn diffuse(
        &self,
        schedule: &ExerciseSchedule,
        num_paths: usize,
        antithetic: bool,
        rng: &mut dyn RngCore,
    ) -> PricingResult<PathSet> {
        validate_paths(num_paths)?;
        let dim = self.dimension();
        let rows = if antithetic { 2 * num_paths } else { num_paths };
        let mut brownian = Array2::<f64>::zeros((rows, dim));
        let mut z = vec![0.0; dim];
        let mut tables = Vec::with_capacity(schedule.len());

        for i in 0..schedule.len() {
            let sqrt_dt = schedule.step(i).sqrt();
            for p in 0..num_paths {
                rng::fill_gaussians(rng, &mut z);
                for a in 0..dim {
                    let mut increment = 0.0;
                    for k in 0..=a {
                        increment += self.cholesky[[a, k]] * z[k];
                    }
                    increment *= sqrt_dt;
                    brownian[[p, a]] += increment;
                    if antithetic {
                        brownian[[num_paths + p, a]] -= increment;
                    }
                }
            }

            let drift = self.drift(schedule.dates()[i]);
            let mut prices = brownian.clone();
            for (a, mut column) in prices.columns_mut().into_iter().enumerate() {
                let (s0, mu) = (self.s0[a], drift[a]);
                column.mapv_inplace(|w| s0 * (mu + w).exp());
            }
            tables.push(prices);
        }

        PathSet::new(tables, num_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng_from_u64;
    use ndarray::array;

    #[test]
    fn test_rejects_mismatched_inputs() {
        let corr = Array2::eye(2);
        assert!(BlackScholesMulti::new(vec![100.0, 100.0], 0.05, vec![0.2], vec![0.0, 0.0], corr.clone()).is_err());
        assert!(BlackScholesMulti::new(vec![100.0], 0.05, vec![0.2], vec![0.0], corr.clone()).is_err());
        let asym = array![[1.0, 0.5], [0.2, 1.0]];
        assert!(BlackScholesMulti::new(vec![100.0, 100.0], 0.05, vec![0.2, 0.2], vec![0.0, 0.0], asym).is_err());
        let out_of_range = array![[1.0, 1.5], [1.5, 1.0]];
        assert!(BlackScholesMulti::new(vec![100.0, 100.0], 0.05, vec![0.2, 0.2], vec![0.0, 0.0], out_of_range).is_err());
    }

    #[test]
    fn test_cholesky_of_identity_correlation() {
        let model = BlackScholesMulti::new(vec![100.0, 90.0], 0.05, vec![0.2, 0.3], vec![0.0, 0.0], Array2::eye(2)).unwrap();
        let l = model.cholesky();
        assert!((l[[0, 0]] - 0.2).abs() < 1e-15);
        assert!((l[[1, 1]] - 0.3).abs() < 1e-15);
        assert_eq!(l[[1, 0]], 0.0);
    }

    #[test]
    fn test_shapes() {
        let model = BlackScholesMulti::new(vec![100.0, 90.0, 80.0], 0.05, vec![0.2, 0.3, 0.25], vec![0.0; 3], Array2::eye(3)).unwrap();
        let schedule = ExerciseSchedule::uniform(1.0, 3).unwrap();
        let paths = model.diffuse(&schedule, 20, true, &mut seed_rng_from_u64(1)).unwrap();
        assert_eq!(paths.num_dates(), 3);
        assert_eq!(paths.num_paths(), 40);
        assert_eq!(paths.num_assets(), 3);
        assert!(paths.at(2).iter().all(|&s| s > 0.0 && s.is_finite()));
    }
}
