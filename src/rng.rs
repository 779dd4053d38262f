// src/rng.rs
//! Random Number Generation for Monte Carlo Simulations
//!
//! # Design Philosophy
//!
//! Regression-based pricing is only as good as its random inputs:
//! 1. **Reproducibility**: Same seed → same paths → same fitted policy
//! 2. **Explicit streams**: every draw goes through a stream passed in by the caller,
//!    so one stream per worker gives deterministic parallel tests
//! 3. **Exact pairing**: normals are produced two at a time so that a fixed seed
//!    yields bit-identical variates
//!
//! # Box-Muller Transform
//!
//! Converts uniform random variables to normal distributions:
//! ```text
//! Z₁ = √(-2ln(U₁)) * cos(2πU₂)
//! Z₂ = √(-2ln(U₁)) * sin(2πU₂)
//! ```
//! where U₁, U₂ ~ Uniform(0,1] and Z₁, Z₂ ~ N(0,1).
//!
//! Uniforms are taken as `1 - u` with `u ∈ [0,1)`, so the logarithm never sees zero.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Seed used by diffusion models when none is given
pub const DEFAULT_SEED: u64 = 1234;

#[inline]
fn open_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.gen::<f64>()
}

/// Single standard normal from two uniforms (cosine branch only)
pub fn box_muller_single<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = open_uniform(rng);
    let u2 = open_uniform(rng);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Pair of independent standard normals from two uniforms
pub fn box_muller_pair<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let u1 = open_uniform(rng);
    let u2 = open_uniform(rng);
    let mag = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * PI * u2;
    (mag * angle.cos(), mag * angle.sin())
}

/// Fill `out` with standard normals.
///
/// Slots are filled pairwise from [`box_muller_pair`]; an odd trailing slot uses
/// [`box_muller_single`]. The sequence is therefore fully determined by the
/// stream state and `out.len()`.
pub fn fill_gaussians<R: Rng + ?Sized>(rng: &mut R, out: &mut [f64]) {
    let mut pairs = out.chunks_exact_mut(2);
    for pair in &mut pairs {
        let (z1, z2) = box_muller_pair(rng);
        pair[0] = z1;
        pair[1] = z2;
    }
    if let [last] = pairs.into_remainder() {
        *last = box_muller_single(rng);
    }
}

/// Generate `n` standard normals
pub fn generate_gaussians<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n];
    fill_gaussians(rng, &mut out);
    out
}

/// Independent stream for one engine or worker
pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
