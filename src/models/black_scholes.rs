// src/models/black_scholes.rs
//! Single-asset lognormal diffusion
//!
//! Between consecutive exercise dates the price is advanced with the exact
//! solution of `dS = (r - q) S dt + σ S dW`:
//! ```text
//! S_{i+1} = S_i * exp((r - q - σ²/2)Δt + σ√Δt * Z)
//! ```
//! With antithetic sampling, rows `n..2n` reuse the draws of rows `0..n` with `Z → -Z`.

use super::model::{DiffusionModel, ExerciseSchedule, PathSet};
use crate::error::{validation::*, PricingResult};
use crate::rng::{self, DEFAULT_SEED};
use ndarray::Array2;
use rand::RngCore;

#[derive(Debug, Clone)]
pub struct BlackScholes1D {
    pub s0: f64,
    pub r: f64,
    pub sigma: f64,
    pub q: f64,
    pub seed: u64,
}

impl BlackScholes1D {
    pub fn new(s0: f64, r: f64, sigma: f64, q: f64) -> PricingResult<Self> {
        Self::with_seed(s0, r, sigma, q, DEFAULT_SEED)
    }

    pub fn with_seed(s0: f64, r: f64, sigma: f64, q: f64, seed: u64) -> PricingResult<Self> {
        validate_positive("s0", s0)?;
        validate_finite("r", r)?;
        validate_non_negative("sigma", sigma)?;
        validate_finite("sigma", sigma)?;
        validate_finite("q", q)?;
        Ok(BlackScholes1D {
            s0,
            r,
            sigma,
            q,
            seed,
        })
    }

    pub fn exact_step(&self, s_t: f64, dt: f64, normal_draw: f64) -> f64 {
        s_t * ((self.r - self.q - 0.5 * self.sigma * self.sigma) * dt
            + self.sigma * dt.sqrt() * normal_draw)
            .exp()
    }
}

impl DiffusionModel for BlackScholes1D {
    fn dimension(&self) -> usize {
        1
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
        let rows = if antithetic { 2 * num_paths } else { num_paths };
        let mut current = vec![self.s0; rows];
        let mut tables = Vec::with_capacity(schedule.len());
        let mut gaussians = vec![0.0; num_paths];

        for i in 0..schedule.len() {
            let dt = schedule.step(i);
            let drift = (self.r - self.q - 0.5 * self.sigma * self.sigma) * dt;
            let vol = self.sigma * dt.sqrt();
            rng::fill_gaussians(rng, &mut gaussians);

            let (head, tail) = current.split_at_mut(num_paths);
            for (s, &z) in head.iter_mut().zip(&gaussians) {
                *s *= (drift + vol * z).exp();
            }
            if antithetic {
                for (s, &z) in tail.iter_mut().zip(&gaussians) {
                    *s *= (drift - vol * z).exp();
                }
            }

            tables.push(Array2::from_shape_fn((rows, 1), |(p, _)| current[p]));
        }

        PathSet::new(tables, num_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng_from_u64;
    use approx::assert_relative_eq;

    #[test]
    fn test_parameter_validation() {
        assert!(BlackScholes1D::new(-1.0, 0.05, 0.2, 0.0).is_err());
        assert!(BlackScholes1D::new(100.0, f64::NAN, 0.2, 0.0).is_err());
        assert!(BlackScholes1D::new(100.0, 0.05, -0.2, 0.0).is_err());
        assert!(BlackScholes1D::new(100.0, 0.05, 0.0, 0.0).is_ok());
        assert_eq!(BlackScholes1D::new(100.0, 0.05, 0.2, 0.0).unwrap().seed, DEFAULT_SEED);
    }

    #[test]
    fn test_shape_and_antithetic_rows() {
        let model = BlackScholes1D::new(100.0, 0.05, 0.2, 0.01).unwrap();
        let schedule = ExerciseSchedule::uniform(1.0, 4).unwrap();
        let mut rng = seed_rng_from_u64(9);

        let plain = model.diffuse(&schedule, 50, false, &mut rng).unwrap();
        assert_eq!(plain.num_dates(), 4);
        assert_eq!(plain.num_paths(), 50);
        assert_eq!(plain.num_assets(), 1);

        let anti = model.diffuse(&schedule, 50, true, &mut rng).unwrap();
        assert_eq!(anti.num_paths(), 100);
        assert!(anti.is_antithetic());
    }

    #[test]
    fn test_exact_step_matches_diffusion() {
        let model = BlackScholes1D::new(100.0, 0.03, 0.25, 0.0).unwrap();
        let schedule = ExerciseSchedule::new(vec![0.5]).unwrap();
        let paths = model.diffuse(&schedule, 3, false, &mut seed_rng_from_u64(5)).unwrap();
        let z = rng::generate_gaussians(&mut seed_rng_from_u64(5), 3);
        for p in 0..3 {
            assert_relative_eq!(
                paths.at(0)[[p, 0]],
                model.exact_step(100.0, 0.5, z[p]),
                max_relative = 1e-14
            );
        }
    }

    #[test]
    fn test_rejects_zero_paths() {
        let model = BlackScholes1D::new(100.0, 0.05, 0.2, 0.0).unwrap();
        let schedule = ExerciseSchedule::uniform(1.0, 2).unwrap();
        assert!(model.diffuse(&schedule, 0, false, &mut seed_rng_from_u64(1)).is_err());
    }
}
