//! Basic usage: properties, runners and reading a result.
//!
//! Run with `RUST_LOG=propcheck=debug` to see run and shrink milestones.

use std::time::Duration;

use propcheck::{
    RunMode, Runner, TestConfig, check, check_with_config, int_range, list, property,
};
use tracing_subscriber::EnvFilter;

fn example_passing_property() {
    println!("=== Passing property ===");

    let prop = property(
        "addition commutes",
        propcheck::tuple2(int_range(-100, 100), int_range(-100, 100)),
        |(a, b): &(i32, i32)| a + b == b + a,
    );

    match check(&prop) {
        Ok(result) => println!("{result}"),
        Err(error) => println!("run aborted: {error}"),
    }
}

fn example_failing_property() {
    println!("\n=== Failing property ===");

    let prop = property("below fifty", int_range(0, 1000), |x: &i32| *x < 50);
    let runner = Runner::new(TestConfig::default().with_iterations(200));

    match runner.check(&prop) {
        Ok(result) => {
            println!("{result}");
            println!("  raw input:    {:?}", result.raw_counterexample);
            println!("  shrunk input: {:?}", result.shrunk_counterexample);
            println!("  replay with seed {}", result.seed);
        }
        Err(error) => println!("run aborted: {error}"),
    }
}

fn example_builder() {
    println!("\n=== Builder ===");

    let runner = match Runner::builder()
        .iterations(500)
        .seed(42)
        .max_shrink_iterations(200)
        .shrink_timeout(Duration::from_secs(2))
        .verbose()
        .build()
    {
        Ok(runner) => runner,
        Err(error) => {
            println!("bad configuration: {error}");
            return;
        }
    };

    let prop = property(
        "sum stays small",
        list(int_range(0, 50), 0, 10),
        |values: &Vec<i32>| values.iter().sum::<i32>() < 200,
    );
    if let Ok(result) = runner.check(&prop) {
        println!("{result}");
    }
}

fn example_exhaustive_mode() {
    println!("\n=== Exhaustive mode ===");

    let prop = property("mostly small", int_range(0, 99), |x: &i32| *x < 90);
    let config = TestConfig::default()
        .with_iterations(1000)
        .with_mode(RunMode::Exhaustive);

    if let Ok(result) = check_with_config(&prop, config) {
        println!(
            "{} of {} trials failed; minimal failure {:?}",
            result.num_failed, result.num_tests, result.shrunk_counterexample
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    example_passing_property();
    example_failing_property();
    example_builder();
    example_exhaustive_mode();
}
