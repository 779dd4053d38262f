// src/math_utils.rs
use crate::error::{PricingError, PricingResult};
use log::warn;
use ndarray::Array2;
use statrs::function::erf;
use std::f64::consts::SQRT_2;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Pivots at or below this magnitude are treated as zero by [`ldl_decomposition`]
const PIVOT_EPSILON: f64 = 1e-14;

/// Unit lower-triangular `L` and pivots `D` with `M = L·diag(D)·Lᵀ`.
///
/// Computed column by column. A pivot that is zero up to rounding leaves the rest
/// of its column at zero instead of dividing by it; negative pivots are kept
/// as computed and only clamped by [`matrix_square_root`].
pub fn ldl_decomposition(m: &Array2<f64>) -> PricingResult<(Array2<f64>, Vec<f64>)> {
    let (rows, cols) = m.dim();
    if rows != cols {
        return Err(PricingError::DimensionMismatch {
            context: "matrix square root (square input)".to_string(),
            expected: rows,
            found: cols,
        });
    }

    let size = rows;
    let mut l = Array2::<f64>::zeros((size, size));
    let mut d = vec![0.0; size];

    for j in 0..size {
        let mut pivot = m[[j, j]];
        for k in 0..j {
            pivot -= l[[j, k]] * l[[j, k]] * d[k];
        }
        d[j] = pivot;
        l[[j, j]] = 1.0;

        let scale = m[[j, j]].abs().max(1.0);
        if pivot.abs() <= PIVOT_EPSILON * scale {
            continue;
        }

        for i in (j + 1)..size {
            let mut value = m[[i, j]];
            for k in 0..j {
                value -= l[[i, k]] * l[[j, k]] * d[k];
            }
            l[[i, j]] = value / pivot;
        }
    }

    Ok((l, d))
}

/// Lower-triangular square root `L·diag(√D⁺)` of a symmetric matrix.
///
/// Precondition: `m` is positive semi-definite up to rounding. Non-positive pivots
/// are clamped to zero, giving a reduced-rank factor.
pub fn matrix_square_root(m: &Array2<f64>) -> PricingResult<Array2<f64>> {
    let (mut l, d) = ldl_decomposition(m)?;

    for (j, &pivot) in d.iter().enumerate() {
        let root = if pivot > 0.0 {
            pivot.sqrt()
        } else {
            if pivot < -PIVOT_EPSILON * m[[j, j]].abs().max(1.0) {
                warn!(
                    "matrix square root: pivot {} at column {} is negative, clamped to zero",
                    pivot, j
                );
            }
            0.0
        };
        l.column_mut(j).mapv_inplace(|v| v * root);
    }

    Ok(l)
}

fn partition_last_pivot(values: &mut [f64]) -> usize {
    let high = values.len() - 1;
    let pivot = values[high];
    let mut store = 0;
    for j in 0..high {
        if values[j] < pivot {
            values.swap(store, j);
            store += 1;
        }
    }
    values.swap(store, high);
    store
}

/// In-place quicksort with the last element as pivot (Lomuto partition).
///
/// Recurses into the smaller side only, so stack depth stays logarithmic.
pub fn quicksort(values: &mut [f64]) {
    let mut slice = values;
    while slice.len() > 1 {
        let p = partition_last_pivot(slice);
        let (left, right) = std::mem::take(&mut slice).split_at_mut(p);
        let right = &mut right[1..];
        if left.len() < right.len() {
            quicksort(left);
            slice = right;
        } else {
            quicksort(right);
            slice = left;
        }
    }
}

/// Sample mean and standard error of the mean
pub fn mean_and_std_error(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n == 1 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    (mean, (variance / n as f64).sqrt())
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
