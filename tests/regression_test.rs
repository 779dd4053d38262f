// tests/regression_test.rs
use approx::assert_relative_eq;
use fast_lsm::math_utils::quicksort;
use fast_lsm::regression::{
    compute_knots, least_squares, CoefficientHistory, ContinuationEngine, FitState,
    RegressionBasis, RegressionContinuation, Standardization,
};
use nalgebra::DVector;
use ndarray::{Array1, Array2};
use proptest::prelude::*;

proptest! {
    #[test]
    fn quicksort_sorts_any_sample(mut values in prop::collection::vec(-1e6f64..1e6, 0..200)) {
        let mut expected = values.clone();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        quicksort(&mut values);
        prop_assert_eq!(values, expected);
    }

    #[test]
    fn knots_are_sample_points_in_order(
        values in prop::collection::vec(0.0f64..100.0, 1..300),
        num_knots in 3usize..12,
    ) {
        let knots = compute_knots(num_knots, &values).unwrap();
        prop_assert_eq!(knots.len(), num_knots - 1);
        prop_assert!(knots.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(knots.iter().all(|k| values.contains(k)));
    }
}

#[test]
fn test_least_squares_recovers_cubic() {
    let n = 40;
    let states = Array2::from_shape_fn((n, 1), |(i, _)| -2.0 + 4.0 * i as f64 / (n - 1) as f64);
    let basis = RegressionBasis::new(3, 1).unwrap();
    let x = basis.evaluate(&states, &Standardization::identity(1)).unwrap();
    let y = DVector::from_iterator(n, states.column(0).iter().map(|s| 1.0 - 2.0 * s + 0.5 * s.powi(3)));

    let beta = least_squares(&x, &y).expect("well-posed system");
    let expected = [1.0, -2.0, 0.0, 0.5];
    for (b, e) in beta.iter().zip(expected.iter()) {
        assert_relative_eq!(*b, *e, epsilon = 1e-8);
    }
}

#[test]
fn test_two_dimensional_fit_is_exact_on_basis_span() {
    let n = 60;
    let states = Array2::from_shape_fn((n, 2), |(i, j)| {
        if j == 0 {
            80.0 + (i % 10) as f64 * 4.0
        } else {
            90.0 + (i / 10) as f64 * 5.0
        }
    });
    let target: Array1<f64> = states
        .rows()
        .into_iter()
        .map(|row| 3.0 + 0.1 * row[0] - 0.2 * row[1] + 0.01 * row[0] * row[1])
        .collect();

    let mut engine = RegressionContinuation::longstaff_schwartz(2, 2).unwrap();
    engine.begin_backward_sweep();
    let fitted = engine.compute_continuation(&target, &states).unwrap();
    for (f, t) in fitted.iter().zip(target.iter()) {
        assert_relative_eq!(*f, *t, epsilon = 1e-8);
    }
}

#[test]
fn test_forward_replay_matches_backward_fit() {
    let dates = 4;
    let tables: Vec<Array2<f64>> = (0..dates)
        .map(|d| Array2::from_shape_fn((50, 1), |(p, _)| 8.0 + 0.2 * p as f64 + d as f64))
        .collect();
    let mut engine = RegressionContinuation::carriere(3, 1, 5).unwrap();
    engine.begin_backward_sweep();

    let mut in_sample = Vec::new();
    let mut running = Array1::from_shape_fn(50, |p| (15.0 - tables[dates - 1][[p, 0]]).max(0.0));
    for i in (0..dates - 1).rev() {
        let continuation = engine.compute_continuation(&running, &tables[i]).unwrap();
        running = running.mapv(|v| 0.9 * v + 0.1);
        in_sample.push((i, continuation));
    }
    engine.finish_backward_sweep();
    assert_eq!(engine.state(), FitState::Fitted);
    assert_eq!(engine.fitted_count(), dates - 1);

    for (i, continuation) in in_sample {
        let fit_index = CoefficientHistory::fit_index_for_date(i, dates).unwrap();
        let replayed = engine.compute_continuation_forward_pass(&tables[i], fit_index).unwrap();
        assert_eq!(replayed, continuation);
    }
}
