//! Diffusion models producing per-date price tables

pub mod black_scholes;
pub mod model;
pub mod multi_asset;

pub use black_scholes::BlackScholes1D;
pub use model::{DiffusionModel, ExerciseSchedule, PathSet};
pub use multi_asset::BlackScholesMulti;
