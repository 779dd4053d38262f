// src/mc/lsm_engine.rs
//! Regression-based Monte Carlo pricing of Bermudan options
//!
//! # Backward pass (Longstaff-Schwartz)
//!
//! ```text
//! V_N = e^{-r t_N} h(S_{t_N})
//! for i = N-1 .. 1:
//!     C_i = E[V_{i+1} | S_{t_i}]          (regression, fitted on these paths)
//!     V_i = e^{-r t_i} h(S_{t_i})  if  e^{-r t_i} h(S_{t_i}) ≥ C_i
//!           V_{i+1}                otherwise
//! price = mean(V_1)
//! ```
//! The estimate is optimistic: the policy is judged on the sample it was fitted on.
//!
//! # Forward pass (policy replay)
//!
//! Fresh paths are drawn from the same model and stream. Each path exercises at
//! the first date where the discounted payoff reaches the stored continuation
//! fit, or receives the discounted terminal payoff. The mean is an
//! out-of-sample estimate, typically at or below the backward one; the gap
//! between the two measures regression quality.
//!
//! Dates are processed sequentially; within a date, payoffs, regressors and
//! exercise decisions are computed in parallel across paths.

use crate::error::{validation::*, PricingError, PricingResult};
use crate::math_utils::{mean_and_std_error, Timer};
use crate::mc::payoffs::{OptionType, Payoff, PayoffEvaluator};
use crate::models::{DiffusionModel, ExerciseSchedule, PathSet};
use crate::regression::{CoefficientHistory, ContinuationEngine, FitState, RegressionConfig};
use crate::rng;
use log::{debug, info};
use ndarray::{Array1, Zip};
use rand::rngs::StdRng;
use std::sync::Arc;

/// Sample mean of discounted values with its standard error
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEstimate {
    pub price: f64,
    pub std_error: f64,
    /// Paths driven by independent draws (pairs count once under antithetic sampling)
    pub independent_samples: usize,
}

impl PriceEstimate {
    fn from_values(values: &Array1<f64>, independent: usize) -> PricingResult<Self> {
        let n = values.len();
        let price = values.sum() / n as f64;

        // antithetic rows n..2n mirror rows 0..n; each pair is one independent sample
        let samples: Vec<f64> = if n == 2 * independent {
            (0..independent)
                .map(|i| 0.5 * (values[i] + values[i + independent]))
                .collect()
        } else {
            values.to_vec()
        };
        let std_error = mean_and_std_error(&samples).1;

        if !price.is_finite() || !std_error.is_finite() {
            return Err(PricingError::NumericalInstability {
                method: "Monte Carlo".to_string(),
                reason: format!("estimate is not finite: {} ± {}", price, std_error),
            });
        }

        Ok(PriceEstimate {
            price,
            std_error,
            independent_samples: independent,
        })
    }
}

/// Backward and forward estimates from one pricing run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LsmResult {
    pub backward: PriceEstimate,
    pub forward: PriceEstimate,
}

impl LsmResult {
    /// Backward minus forward estimate
    pub fn gap(&self) -> f64 {
        self.backward.price - self.forward.price
    }

    /// Standard error of [`LsmResult::gap`], treating both passes as independent
    pub fn gap_std_error(&self) -> f64 {
        self.backward.std_error.hypot(self.forward.std_error)
    }
}

pub struct PricingEngine {
    model: Box<dyn DiffusionModel>,
    payoff: Arc<dyn PayoffEvaluator>,
    r: f64,
    continuation: Option<Box<dyn ContinuationEngine>>,
    rng: StdRng,
    fitted_schedule: Option<ExerciseSchedule>,
}

impl PricingEngine {
    /// Engine with a regression-based exercise policy
    pub fn new(
        model: Box<dyn DiffusionModel>,
        option_type: OptionType,
        strike: f64,
        r: f64,
        regression: RegressionConfig,
    ) -> PricingResult<Self> {
        validate_positive("strike", strike)?;
        Self::with_payoff(model, Arc::new(Payoff::new(option_type, strike)), r, Some(regression))
    }

    /// Engine that only exercises at the last date (European value of the contract)
    pub fn terminal_only(
        model: Box<dyn DiffusionModel>,
        option_type: OptionType,
        strike: f64,
        r: f64,
    ) -> PricingResult<Self> {
        validate_positive("strike", strike)?;
        Self::with_payoff(model, Arc::new(Payoff::new(option_type, strike)), r, None)
    }

    /// Engine around any payoff evaluator
    pub fn with_payoff(
        model: Box<dyn DiffusionModel>,
        payoff: Arc<dyn PayoffEvaluator>,
        r: f64,
        regression: Option<RegressionConfig>,
    ) -> PricingResult<Self> {
        validate_finite("r", r)?;
        if let Some(assets) = payoff.num_assets() {
            validate_same_len("payoff assets", model.dimension(), assets)?;
        }

        let continuation = match regression {
            Some(config) => {
                config.validate()?;
                validate_same_len("regression state dimension", model.dimension(), config.dimension)?;
                let engine: Box<dyn ContinuationEngine> = Box::new(config.build(payoff.clone())?);
                Some(engine)
            }
            None => None,
        };

        let rng = rng::seed_rng_from_u64(model.seed());
        Ok(Self {
            model,
            payoff,
            r,
            continuation,
            rng,
            fitted_schedule: None,
        })
    }

    /// Restart the engine's random stream
    pub fn reseed(&mut self, seed: u64) {
        self.rng = rng::seed_rng_from_u64(seed);
    }

    pub fn has_exercise_policy(&self) -> bool {
        self.continuation.is_some()
    }

    pub fn continuation_state(&self) -> Option<FitState> {
        self.continuation.as_ref().map(|c| c.state())
    }

    fn discount(&self, t: f64) -> f64 {
        (-self.r * t).exp()
    }

    /// Draw a fresh path set from the engine's stream
    pub fn simulate(
        &mut self,
        schedule: &ExerciseSchedule,
        num_paths: usize,
        antithetic: bool,
    ) -> PricingResult<PathSet> {
        self.model.diffuse(schedule, num_paths, antithetic, &mut self.rng)
    }

    fn check_paths(&self, schedule: &ExerciseSchedule, paths: &PathSet) -> PricingResult<()> {
        validate_same_len("path set dates", schedule.len(), paths.num_dates())?;
        validate_same_len("path set assets", self.model.dimension(), paths.num_assets())
    }

    fn discounted_payoff(&self, schedule: &ExerciseSchedule, paths: &PathSet, i: usize) -> Array1<f64> {
        self.payoff.evaluate(paths.at(i)) * self.discount(schedule.dates()[i])
    }

    /// Backward induction on freshly simulated paths
    pub fn backward_pass(
        &mut self,
        schedule: &ExerciseSchedule,
        num_paths: usize,
        antithetic: bool,
    ) -> PricingResult<PriceEstimate> {
        let paths = self.simulate(schedule, num_paths, antithetic)?;
        self.backward_pass_on(schedule, &paths)
    }

    /// Backward induction on a given path set; fits and stores the exercise policy
    pub fn backward_pass_on(
        &mut self,
        schedule: &ExerciseSchedule,
        paths: &PathSet,
    ) -> PricingResult<PriceEstimate> {
        self.check_paths(schedule, paths)?;
        let timer = Timer::new();
        let last = schedule.len() - 1;
        let mut running = self.discounted_payoff(schedule, paths, last);

        if self.continuation.is_some() {
            let exercise_values: Vec<Array1<f64>> = (0..last)
                .map(|i| self.discounted_payoff(schedule, paths, i))
                .collect();
            self.fitted_schedule = None;

            if let Some(engine) = self.continuation.as_mut() {
                engine.begin_backward_sweep();
                for i in (0..last).rev() {
                    let exercise = &exercise_values[i];
                    let continuation = engine.compute_continuation(&running, paths.at(i))?;

                    Zip::from(&mut running)
                        .and(exercise)
                        .and(&continuation)
                        .par_for_each(|value, &e, &c| {
                            if e >= c {
                                *value = e;
                            }
                        });

                    debug!(
                        "backward date {} (t = {}): {} of {} paths exercise",
                        i,
                        schedule.dates()[i],
                        exercise.iter().zip(continuation.iter()).filter(|(e, c)| e >= c).count(),
                        paths.num_paths()
                    );
                }
                engine.finish_backward_sweep();
            }
            self.fitted_schedule = Some(schedule.clone());
        }

        let estimate = PriceEstimate::from_values(&running, paths.independent_paths())?;
        info!(
            "backward pass: {:.6} ± {:.6} over {} paths in {:.1} ms",
            estimate.price,
            estimate.std_error,
            paths.num_paths(),
            timer.elapsed_ms()
        );
        Ok(estimate)
    }

    /// Replay the fitted policy on freshly simulated, independent paths
    pub fn forward_pass(
        &mut self,
        schedule: &ExerciseSchedule,
        num_paths: usize,
        antithetic: bool,
    ) -> PricingResult<PriceEstimate> {
        self.check_policy(schedule)?;
        let paths = self.simulate(schedule, num_paths, antithetic)?;
        self.forward_pass_on(schedule, &paths)
    }

    fn check_policy(&self, schedule: &ExerciseSchedule) -> PricingResult<()> {
        let engine = match &self.continuation {
            Some(engine) => engine,
            None => return Ok(()),
        };
        if engine.state() != FitState::Fitted {
            return Err(PricingError::PolicyNotFitted {
                reason: "run a backward pass before the forward pass".to_string(),
            });
        }
        if self.fitted_schedule.as_ref() != Some(schedule) {
            return Err(PricingError::PolicyNotFitted {
                reason: "the policy was fitted on a different exercise schedule".to_string(),
            });
        }
        validate_same_len("fitted regressions", schedule.len() - 1, engine.fitted_count())
    }

    /// Replay the fitted policy on a given path set
    pub fn forward_pass_on(
        &self,
        schedule: &ExerciseSchedule,
        paths: &PathSet,
    ) -> PricingResult<PriceEstimate> {
        self.check_policy(schedule)?;
        self.check_paths(schedule, paths)?;
        let timer = Timer::new();
        let n = paths.num_paths();
        let last = schedule.len() - 1;
        let mut realized = Array1::<f64>::zeros(n);
        let mut exercised = Array1::from_elem(n, false);

        if let Some(engine) = &self.continuation {
            for i in 0..last {
                let fit_index = CoefficientHistory::fit_index_for_date(i, schedule.len())
                    .ok_or_else(|| PricingError::PolicyNotFitted {
                        reason: format!("no regression for exercise date {}", i),
                    })?;
                let exercise = self.discounted_payoff(schedule, paths, i);
                let continuation = engine.compute_continuation_forward_pass(paths.at(i), fit_index)?;

                Zip::from(&mut realized)
                    .and(&mut exercised)
                    .and(&exercise)
                    .and(&continuation)
                    .par_for_each(|value, done, &e, &c| {
                        if !*done && e >= c {
                            *value = e;
                            *done = true;
                        }
                    });

                debug!(
                    "forward date {} (t = {}): {} of {} paths exercised so far",
                    i,
                    schedule.dates()[i],
                    exercised.iter().filter(|&&d| d).count(),
                    n
                );
            }
        }

        let terminal = self.discounted_payoff(schedule, paths, last);
        Zip::from(&mut realized)
            .and(&exercised)
            .and(&terminal)
            .par_for_each(|value, &done, &p| {
                if !done {
                    *value = p;
                }
            });

        let estimate = PriceEstimate::from_values(&realized, paths.independent_paths())?;
        info!(
            "forward pass: {:.6} ± {:.6} over {} paths in {:.1} ms",
            estimate.price,
            estimate.std_error,
            n,
            timer.elapsed_ms()
        );
        Ok(estimate)
    }

    /// Backward pass followed by a forward pass on independent paths
    pub fn price(
        &mut self,
        schedule: &ExerciseSchedule,
        num_paths: usize,
        antithetic: bool,
    ) -> PricingResult<LsmResult> {
        let backward = self.backward_pass(schedule, num_paths, antithetic)?;
        let forward = self.forward_pass(schedule, num_paths, antithetic)?;
        Ok(LsmResult { backward, forward })
    }
}
