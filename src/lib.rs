//! # fast-lsm: Regression Monte Carlo for Bermudan Options
//!
//! Prices options that may be exercised on a finite set of dates by simulating
//! asset paths and estimating continuation values with least-squares regression.
//!
//! ## Key Features
//!
//! - **Diffusion models**: single-asset Black-Scholes and correlated multi-asset lognormal
//! - **Three continuation estimators**: Longstaff-Schwartz polynomial regression, the
//!   payoff-augmented variant, and Carriere's piecewise (knot-based) regression
//! - **Two estimates per run**: in-sample backward induction and an out-of-sample
//!   forward replay of the fitted policy on fresh paths
//! - **Antithetic sampling** with standard errors computed over independent pairs
//! - **Parallel evaluation** of payoffs, regressors and exercise decisions with Rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use fast_lsm::mc::{OptionType, PricingEngine};
//! use fast_lsm::models::{BlackScholes1D, ExerciseSchedule};
//! use fast_lsm::regression::RegressionConfig;
//!
//! let model = BlackScholes1D::new(11.0, 0.05, 0.4, 0.0).expect("valid model");
//! let config = RegressionConfig { degree: 4, ..Default::default() };
//! let mut engine = PricingEngine::new(Box::new(model), OptionType::Put, 15.0, 0.05, config)
//!     .expect("valid engine");
//!
//! let dates = ExerciseSchedule::new((1..=10).map(|i| i as f64 / 10.0).collect()).expect("valid dates");
//! let result = engine.price(&dates, 2_000, true).expect("pricing succeeds");
//! println!(
//!     "backward {:.4} ± {:.4}, forward {:.4} ± {:.4}",
//!     result.backward.price, result.backward.std_error,
//!     result.forward.price, result.forward.std_error
//! );
//! ```
//!
//! ## Mathematical Foundation
//!
//! At each exercise date `t_i` the holder compares the discounted payoff
//! `e^{-r t_i} h(S_{t_i})` with the continuation value
//! `C_i(S) = E[V_{i+1} | S_{t_i} = S]`, approximated by regressing realized
//! discounted cash flows on a basis of the state.

// Module declarations
pub mod error;
pub mod rng;
pub mod math_utils;
pub mod models;
pub mod regression;
pub mod mc;
pub mod analytics;

// Re-export commonly used types for convenience
pub use error::{PricingError, PricingResult};
pub use mc::{LsmResult, OptionType, Payoff, PayoffEvaluator, PriceEstimate, PricingEngine};
pub use models::{BlackScholes1D, BlackScholesMulti, DiffusionModel, ExerciseSchedule, PathSet};
pub use regression::{ContinuationEngine, RegressionConfig, RegressionMethod};
