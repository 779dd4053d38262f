//! Payoffs and the regression Monte Carlo pricing engine

pub mod lsm_engine;
pub mod payoffs;

pub use lsm_engine::{LsmResult, PriceEstimate, PricingEngine};
pub use payoffs::{OptionType, Payoff, PayoffEvaluator};
