// demos/bermudan_demo.rs
use fast_lsm::analytics::bs_analytic;
use fast_lsm::error::PricingResult;
use fast_lsm::math_utils::Timer;
use fast_lsm::mc::{LsmResult, OptionType, PricingEngine};
use fast_lsm::models::{BlackScholes1D, BlackScholesMulti, ExerciseSchedule};
use fast_lsm::regression::{RegressionConfig, RegressionMethod};
use ndarray::Array2;

fn report(label: &str, result: &LsmResult, elapsed_ms: f64) {
    println!("{}", label);
    println!(
        "   backward: {:.4} ± {:.4}",
        result.backward.price, result.backward.std_error
    );
    println!(
        "   forward:  {:.4} ± {:.4}",
        result.forward.price, result.forward.std_error
    );
    println!(
        "   gap:      {:.4} ± {:.4}   ({:.0} ms)\n",
        result.gap(),
        result.gap_std_error(),
        elapsed_ms
    );
}

fn single_asset_put(method: RegressionMethod, degree: usize, knots: usize, paths: usize) -> PricingResult<(LsmResult, f64)> {
    let model = BlackScholes1D::new(11.0, 0.05, 0.4, 0.0)?;
    let config = RegressionConfig {
        method,
        degree,
        dimension: 1,
        knots,
    };
    let mut engine = PricingEngine::new(Box::new(model), OptionType::Put, 15.0, 0.05, config)?;
    let dates = ExerciseSchedule::new((1..=10).map(|i| i as f64 / 10.0).collect())?;

    let timer = Timer::new();
    let result = engine.price(&dates, paths, true)?;
    Ok((result, timer.elapsed_ms()))
}

fn best_of_call(paths: usize) -> PricingResult<(LsmResult, f64)> {
    let model = BlackScholesMulti::new(
        vec![110.0, 110.0],
        0.05,
        vec![0.2, 0.2],
        vec![0.1, 0.1],
        Array2::eye(2),
    )?;
    let config = RegressionConfig {
        method: RegressionMethod::Longstaff,
        degree: 5,
        dimension: 2,
        knots: 0,
    };
    let mut engine = PricingEngine::new(Box::new(model), OptionType::BestOfCall, 100.0, 0.05, config)?;
    let dates = ExerciseSchedule::new((1..=9).map(|i| i as f64 / 3.0).collect())?;

    let timer = Timer::new();
    let result = engine.price(&dates, paths, false)?;
    Ok((result, timer.elapsed_ms()))
}

fn run() -> PricingResult<()> {
    println!("Bermudan option pricing with regression Monte Carlo");
    println!("===================================================\n");

    let european = bs_analytic::bs_put_price(11.0, 15.0, 0.05, 0.0, 0.4, 1.0)?;
    println!("Put S0 = 11, K = 15, r = 5%, σ = 40%, ten dates on [0.1, 1]");
    println!("   European (closed form): {:.4}\n", european);

    let (result, ms) = single_asset_put(RegressionMethod::Longstaff, 6, 0, 100_000)?;
    report("1. Longstaff-Schwartz, degree 6, 100k antithetic pairs", &result, ms);

    let (result, ms) = single_asset_put(RegressionMethod::Carriere, 4, 7, 30_000)?;
    report("2. Carriere, degree 4, 7 knots, 30k antithetic pairs", &result, ms);

    let (result, ms) = single_asset_put(RegressionMethod::ModifiedLongstaff, 4, 0, 100_000)?;
    report("3. Modified Longstaff-Schwartz, degree 4, 100k antithetic pairs", &result, ms);

    let (result, ms) = best_of_call(50_000)?;
    report(
        "4. Best-of call on two assets, S0 = 110, K = 100, degree 5, 50k paths",
        &result,
        ms,
    );

    println!("Error handling");
    let config = RegressionConfig {
        method: RegressionMethod::Carriere,
        knots: 2,
        ..Default::default()
    };
    let model = BlackScholes1D::new(11.0, 0.05, 0.4, 0.0)?;
    match PricingEngine::new(Box::new(model), OptionType::Put, 15.0, 0.05, config) {
        Ok(_) => println!("   Unexpected: two knots should be rejected"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("pricing failed: {}", e);
        std::process::exit(1);
    }
}
