// src/regression/knots.rs
//! Knot placement for the Carriere (piecewise polynomial) regression

use super::basis::{BasisFunction, Standardization};
use crate::error::{PricingError, PricingResult};
use crate::math_utils::quicksort;

/// `num_knots - 1` empirical quantile cut points of `values`.
///
/// Cut point `i` is the element at index `⌈i·n / num_knots⌉` of the sorted sample.
pub fn compute_knots(num_knots: usize, values: &[f64]) -> PricingResult<Vec<f64>> {
    if num_knots <= 2 {
        return Err(PricingError::InvalidKnotCount { knots: num_knots });
    }
    if values.is_empty() {
        return Err(PricingError::InvalidConfiguration {
            field: "knots".to_string(),
            reason: "cannot place knots on an empty sample".to_string(),
        });
    }

    let mut sorted = values.to_vec();
    quicksort(&mut sorted);
    let n = sorted.len();

    Ok((1..num_knots)
        .map(|i| {
            let index = (i * n + num_knots - 1) / num_knots;
            sorted[index.min(n - 1)]
        })
        .collect())
}

/// One truncated power function per knot, expressed in standardized coordinates
pub fn hinge_functions(
    knots: &[f64],
    degree: usize,
    standardization: &Standardization,
) -> Vec<BasisFunction> {
    knots
        .iter()
        .map(|&knot| BasisFunction::Hinge {
            knot: standardization.transform(0, knot),
            exponent: degree as i32,
        })
        .collect()
}
