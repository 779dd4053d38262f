// src/analytics/bs_analytic.rs
//! Closed-form Black-Scholes prices for European options on a dividend-paying asset
//!
//! Under the risk-neutral measure the underlying follows:
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! ```
//! A Bermudan option is worth at least its European counterpart, which makes
//! these formulas a lower bound for the Monte Carlo estimates.

use crate::error::{validation::*, PricingResult};
use crate::math_utils::norm_cdf;

fn d1_d2(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> (f64, f64) {
    let vol = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / vol;
    (d1, d1 - vol)
}

fn validate_inputs(s: f64, k: f64, sigma: f64, t: f64) -> PricingResult<()> {
    validate_positive("s", s)?;
    validate_positive("k", k)?;
    validate_positive("sigma", sigma)?;
    validate_positive("t", t)
}

/// European call
///
/// ```text
/// C = S e^{-qT} Φ(d₁) - K e^{-rT} Φ(d₂)
/// d₁ = [ln(S/K) + (r - q + σ²/2)T] / (σ√T),  d₂ = d₁ - σ√T
/// ```
pub fn bs_call_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> PricingResult<f64> {
    validate_inputs(s, k, sigma, t)?;
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t);
    Ok(s * (-q * t).exp() * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2))
}

/// European put
///
/// ```text
/// P = K e^{-rT} Φ(-d₂) - S e^{-qT} Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> PricingResult<f64> {
    validate_inputs(s, k, sigma, t)?;
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t);
    Ok(k * (-r * t).exp() * norm_cdf(-d2) - s * (-q * t).exp() * norm_cdf(-d1))
}
