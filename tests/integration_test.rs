// tests/integration_test.rs
use fast_lsm::analytics::bs_analytic;
use fast_lsm::error::PricingError;
use fast_lsm::mc::{OptionType, PricingEngine};
use fast_lsm::models::{BlackScholes1D, BlackScholesMulti, ExerciseSchedule};
use fast_lsm::regression::{RegressionConfig, RegressionMethod};
use ndarray::Array2;

// Bermudan put, S0 = 11, K = 15, r = 5%, σ = 40%, ten dates on [0.1, 1].
// Binomial tree with 4000 steps gives 4.2704; the European put is worth 4.0381.
const BERMUDAN_PUT: f64 = 4.2704;
const S0: f64 = 11.0;
const STRIKE: f64 = 15.0;
const RATE: f64 = 0.05;
const VOL: f64 = 0.4;

fn put_dates() -> ExerciseSchedule {
    ExerciseSchedule::new((1..=10).map(|i| i as f64 / 10.0).collect()).expect("valid dates")
}

fn put_engine(method: RegressionMethod, degree: usize, knots: usize, seed: u64) -> PricingEngine {
    let model = BlackScholes1D::with_seed(S0, RATE, VOL, 0.0, seed).expect("valid model");
    let config = RegressionConfig {
        method,
        degree,
        dimension: 1,
        knots,
    };
    PricingEngine::new(Box::new(model), OptionType::Put, STRIKE, RATE, config).expect("valid engine")
}

#[test]
fn test_bermudan_put_longstaff_schwartz() {
    let mut engine = put_engine(RegressionMethod::Longstaff, 4, 0, 1234);
    let result = engine.price(&put_dates(), 10_000, true).expect("pricing succeeds");

    println!("backward: {:.4} ± {:.4}", result.backward.price, result.backward.std_error);
    println!("forward:  {:.4} ± {:.4}", result.forward.price, result.forward.std_error);

    assert_eq!(result.backward.independent_samples, 10_000);
    assert!(result.backward.std_error > 0.0 && result.backward.std_error < 0.03);
    assert!((result.backward.price - BERMUDAN_PUT).abs() < 0.08);
    assert!((result.forward.price - BERMUDAN_PUT).abs() < 0.08);
    assert!(result.gap().abs() < 4.0 * result.gap_std_error() + 0.02);

    let european = bs_analytic::bs_put_price(S0, STRIKE, RATE, 0.0, VOL, 1.0).unwrap();
    assert!(result.backward.price > european + 0.1);
    assert!(result.forward.price > european + 0.1);
}

#[test]
fn test_bermudan_put_modified_longstaff_schwartz() {
    let mut engine = put_engine(RegressionMethod::ModifiedLongstaff, 3, 0, 7);
    let result = engine.price(&put_dates(), 10_000, true).expect("pricing succeeds");
    assert!((result.backward.price - BERMUDAN_PUT).abs() < 0.1);
    assert!((result.forward.price - BERMUDAN_PUT).abs() < 0.1);
}

#[test]
fn test_bermudan_put_carriere() {
    let mut engine = put_engine(RegressionMethod::Carriere, 4, 7, 99);
    let result = engine.price(&put_dates(), 10_000, true).expect("pricing succeeds");
    assert!((result.backward.price - BERMUDAN_PUT).abs() < 0.1);
    assert!((result.forward.price - BERMUDAN_PUT).abs() < 0.1);
}

#[test]
fn test_terminal_only_engine_matches_black_scholes() {
    let model = BlackScholes1D::with_seed(S0, RATE, VOL, 0.0, 2024).unwrap();
    let mut engine = PricingEngine::terminal_only(Box::new(model), OptionType::Put, STRIKE, RATE).unwrap();
    assert!(!engine.has_exercise_policy());

    let result = engine.price(&put_dates(), 20_000, true).unwrap();
    let european = bs_analytic::bs_put_price(S0, STRIKE, RATE, 0.0, VOL, 1.0).unwrap();
    for estimate in [result.backward, result.forward] {
        assert!(
            (estimate.price - european).abs() < 4.0 * estimate.std_error,
            "{} vs {} (se {})",
            estimate.price,
            european,
            estimate.std_error
        );
    }
}

#[test]
fn test_terminal_only_call_with_dividends() {
    let model = BlackScholes1D::with_seed(100.0, 0.03, 0.25, 0.02, 5).unwrap();
    let mut engine = PricingEngine::terminal_only(Box::new(model), OptionType::Call, 95.0, 0.03).unwrap();
    let dates = ExerciseSchedule::uniform(2.0, 4).unwrap();
    let estimate = engine.backward_pass(&dates, 20_000, true).unwrap();
    let european = bs_analytic::bs_call_price(100.0, 95.0, 0.03, 0.02, 0.25, 2.0).unwrap();
    assert!((estimate.price - european).abs() < 4.0 * estimate.std_error);
}

#[test]
fn test_two_asset_best_of_call() {
    // Max-call on two independent assets, nine dates over three years; reference value 21.34
    let model = BlackScholesMulti::with_seed(
        vec![110.0, 110.0],
        0.05,
        vec![0.2, 0.2],
        vec![0.1, 0.1],
        Array2::eye(2),
        31,
    )
    .unwrap();
    let config = RegressionConfig {
        method: RegressionMethod::Longstaff,
        degree: 3,
        dimension: 2,
        knots: 0,
    };
    let mut engine = PricingEngine::new(Box::new(model), OptionType::BestOfCall, 100.0, 0.05, config).unwrap();
    let dates = ExerciseSchedule::new((1..=9).map(|i| i as f64 / 3.0).collect()).unwrap();

    let result = engine.price(&dates, 10_000, true).unwrap();
    println!("best-of call: {:.3} / {:.3}", result.backward.price, result.forward.price);
    assert!((result.backward.price - 21.34).abs() < 0.6);
    assert!((result.forward.price - 21.34).abs() < 0.6);
}

#[test]
fn test_forward_pass_requires_matching_policy() {
    let mut engine = put_engine(RegressionMethod::Longstaff, 3, 0, 3);
    let dates = put_dates();
    assert!(matches!(
        engine.forward_pass(&dates, 1_000, false),
        Err(PricingError::PolicyNotFitted { .. })
    ));

    engine.backward_pass(&dates, 2_000, false).unwrap();
    let shorter = ExerciseSchedule::uniform(1.0, 5).unwrap();
    assert!(matches!(
        engine.forward_pass(&shorter, 1_000, false),
        Err(PricingError::PolicyNotFitted { .. })
    ));
    assert!(engine.forward_pass(&dates, 1_000, false).is_ok());
}

#[test]
fn test_refit_replaces_previous_policy() {
    let mut engine = put_engine(RegressionMethod::Longstaff, 3, 0, 8);
    let short = ExerciseSchedule::uniform(1.0, 4).unwrap();
    let long = put_dates();

    engine.backward_pass(&short, 2_000, true).unwrap();
    engine.backward_pass(&long, 2_000, true).unwrap();
    assert!(engine.forward_pass(&short, 500, true).is_err());
    assert!(engine.forward_pass(&long, 500, true).is_ok());
}

#[test]
fn test_same_seed_same_result() {
    let first = put_engine(RegressionMethod::Longstaff, 3, 0, 11)
        .price(&put_dates(), 2_000, true)
        .unwrap();
    let second = put_engine(RegressionMethod::Longstaff, 3, 0, 11)
        .price(&put_dates(), 2_000, true)
        .unwrap();
    assert_eq!(first.backward.price, second.backward.price);
    assert_eq!(first.forward.price, second.forward.price);
}

#[test]
fn test_three_assets_rejected_by_regression() {
    let model = BlackScholesMulti::new(vec![100.0; 3], 0.05, vec![0.2; 3], vec![0.0; 3], Array2::eye(3)).unwrap();
    let config = RegressionConfig {
        dimension: 3,
        ..Default::default()
    };
    let result = PricingEngine::new(Box::new(model), OptionType::WorstOfPut, 100.0, 0.05, config);
    assert!(matches!(
        result,
        Err(PricingError::UnsupportedDimension { dimension: 3, max: 2 })
    ));
}

#[test]
fn test_three_asset_terminal_only_geometric_put() {
    let model = BlackScholesMulti::with_seed(vec![100.0; 3], 0.05, vec![0.2; 3], vec![0.0; 3], Array2::eye(3), 4).unwrap();
    let mut engine = PricingEngine::terminal_only(Box::new(model), OptionType::GeometricPut, 100.0, 0.05).unwrap();
    let dates = ExerciseSchedule::uniform(1.0, 2).unwrap();
    let estimate = engine.backward_pass(&dates, 5_000, true).unwrap();

    // geometric mean of three independent lognormals is lognormal with σ_G² = σ²/3
    let sigma_g = 0.2 / 3.0f64.sqrt();
    let q_g = 0.5 * (0.04 - sigma_g * sigma_g);
    let european = bs_analytic::bs_put_price(100.0, 100.0, 0.05, q_g, sigma_g, 1.0).unwrap();
    assert!((estimate.price - european).abs() < 4.0 * estimate.std_error);
}
