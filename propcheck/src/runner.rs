//! Property execution: trial loop, failure classification and reporting.

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::{ConfigError, GeneratorConfig, RunMode, TestConfig};
use crate::error::{FailureKind, PropertyError};
use crate::generator::Generator;
use crate::property::Property;
use crate::rng::{ValueSource, resolve_seed};
use crate::shrink::{ShrinkEngine, ShrinkOutcome};

/// Where and how the first failing trial failed
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FailureRecord {
    pub kind: FailureKind,
    /// 1-based trial number
    pub iteration: usize,
}

/// Outcome of checking one property.
///
/// Counterexamples are rendered with `Debug`. A passing result carries no
/// counterexample and no failure record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestResult {
    pub passed: bool,
    /// Trials actually executed
    pub num_tests: usize,
    pub num_passed: usize,
    pub num_failed: usize,
    pub property_name: String,
    pub raw_counterexample: Option<String>,
    pub shrunk_counterexample: Option<String>,
    pub shrink_steps: usize,
    pub shrink_outcome: Option<ShrinkOutcome>,
    pub failure: Option<FailureRecord>,
    /// Seed of the value stream; pass it to [`TestConfig::with_seed`] to replay
    pub seed: u64,
    /// Values pulled from the stream during the trial loop
    pub draws: u64,
    pub duration: Duration,
}

impl TestResult {
    pub fn passed(property_name: &str, num_tests: usize, seed: u64, duration: Duration) -> Self {
        Self {
            passed: true,
            num_tests,
            num_passed: num_tests,
            num_failed: 0,
            property_name: property_name.to_string(),
            raw_counterexample: None,
            shrunk_counterexample: None,
            shrink_steps: 0,
            shrink_outcome: None,
            failure: None,
            seed,
            draws: num_tests as u64,
            duration,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn failed(
        property_name: &str,
        num_passed: usize,
        num_failed: usize,
        raw_counterexample: String,
        shrunk_counterexample: String,
        shrink_steps: usize,
        shrink_outcome: ShrinkOutcome,
        failure: FailureRecord,
        seed: u64,
        duration: Duration,
    ) -> Self {
        Self {
            passed: false,
            num_tests: num_passed + num_failed,
            num_passed,
            num_failed,
            property_name: property_name.to_string(),
            raw_counterexample: Some(raw_counterexample),
            shrunk_counterexample: Some(shrunk_counterexample),
            shrink_steps,
            shrink_outcome: Some(shrink_outcome),
            failure: Some(failure),
            seed,
            draws: (num_passed + num_failed) as u64,
            duration,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.passed
    }

    pub fn is_failed(&self) -> bool {
        !self.passed
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            return write!(
                f,
                "{}: passed {} tests (seed: {})",
                self.property_name, self.num_tests, self.seed
            );
        }

        write!(
            f,
            "{}: failed after {} tests (seed: {})",
            self.property_name, self.num_tests, self.seed
        )?;
        if let Some(shrunk) = &self.shrunk_counterexample {
            write!(
                f,
                "\nMinimal failing input: {} ({} shrink steps)",
                shrunk, self.shrink_steps
            )?;
        }
        if let Some(cause) = self.failure.as_ref().and_then(|record| record.kind.cause()) {
            write!(f, "\nCause: {cause}")?;
        }
        Ok(())
    }
}

/// Executes properties under one [`TestConfig`]
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: TestConfig,
}

impl Runner {
    pub fn new(config: TestConfig) -> Self {
        Self { config }
    }

    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::new()
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Check `property` for the configured number of trials
    pub fn check<T>(&self, property: &Property<T>) -> Result<TestResult, PropertyError>
    where
        T: Clone + fmt::Debug + 'static,
    {
        self.check_n(property, self.config.iterations)
    }

    /// Check `property` for `num_tests` trials.
    ///
    /// Only generator exhaustion during the trial loop and an invalid
    /// configuration are errors; failing trials are reported in the
    /// [`TestResult`].
    pub fn check_n<T>(
        &self,
        property: &Property<T>,
        num_tests: usize,
    ) -> Result<TestResult, PropertyError>
    where
        T: Clone + fmt::Debug + 'static,
    {
        let config = self.config.clone().with_iterations(num_tests);
        config.validate()?;

        let start_time = Instant::now();
        let name = property.name();
        let seed = resolve_seed(config.seed);
        let mut source = ValueSource::new(
            property.generator().clone(),
            config.generator_config.clone(),
            seed,
        );
        tracing::debug!(property = name, seed, num_tests, mode = ?config.mode, "checking property");

        let mut num_passed = 0;
        let mut num_failed = 0;
        let mut first_failure: Option<(T, FailureRecord)> = None;

        for iteration in 1..=num_tests {
            let input = source
                .next()
                .map_err(|error| PropertyError::from_generation(error, name, iteration))?;

            match property.evaluate(&input) {
                Ok(()) => num_passed += 1,
                Err(error) => {
                    num_failed += 1;
                    tracing::debug!(property = name, iteration, %error, "trial failed");
                    if first_failure.is_none() {
                        let record = FailureRecord {
                            kind: error.failure_kind(),
                            iteration,
                        };
                        first_failure = Some((input, record));
                    }
                    if config.mode == RunMode::ShortCircuit {
                        break;
                    }
                }
            }
        }

        let Some((input, record)) = first_failure else {
            tracing::debug!(property = name, num_passed, "all trials passed");
            return Ok(TestResult {
                draws: source.draws(),
                ..TestResult::passed(name, num_passed, seed, start_time.elapsed())
            });
        };

        let raw_counterexample = format!("{input:?}");
        let generator = property.generator();
        let engine = ShrinkEngine::with_config(config.shrink_config());
        let shrunk = engine.shrink_with(
            input,
            |candidate: &T| property.evaluate(candidate),
            |candidate: &T| generator.shrink(candidate),
        );

        Ok(TestResult {
            draws: source.draws(),
            ..TestResult::failed(
                name,
                num_passed,
                num_failed,
                raw_counterexample,
                format!("{:?}", shrunk.minimal),
                shrunk.shrink_steps,
                shrunk.outcome,
                record,
                seed,
                start_time.elapsed(),
            )
        })
    }
}

/// Fluent construction of a [`Runner`]
#[derive(Debug, Clone, Default)]
pub struct RunnerBuilder {
    config: TestConfig,
}

impl RunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn max_shrink_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_shrink_iterations = max_iterations;
        self
    }

    pub fn shrink_timeout(mut self, timeout: Duration) -> Self {
        self.config.shrink_timeout = timeout;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.config.verbose = true;
        self
    }

    pub fn mode(mut self, mode: RunMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn exhaustive(self) -> Self {
        self.mode(RunMode::Exhaustive)
    }

    pub fn generator_config(mut self, generator_config: GeneratorConfig) -> Self {
        self.config.generator_config = generator_config;
        self
    }

    /// Validate the configuration and build the runner
    pub fn build(self) -> Result<Runner, ConfigError> {
        self.config.validate()?;
        Ok(Runner::new(self.config))
    }
}

/// Check a property with the default configuration
pub fn check<T>(property: &Property<T>) -> Result<TestResult, PropertyError>
where
    T: Clone + fmt::Debug + 'static,
{
    check_with_config(property, TestConfig::default())
}

/// Check a property with a custom configuration
pub fn check_with_config<T>(
    property: &Property<T>,
    config: TestConfig,
) -> Result<TestResult, PropertyError>
where
    T: Clone + fmt::Debug + 'static,
{
    Runner::new(config).check(property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{frequency, one_of};
    use crate::generator::{Generator, constant};
    use crate::primitives::{int_range, string};
    use crate::property::property;

    fn seeded(iterations: usize) -> Runner {
        Runner::new(TestConfig::default().with_iterations(iterations).with_seed(42))
    }

    #[test]
    fn test_threshold_shrinks_to_boundary() {
        let prop = property("x<50", int_range(0, 1000), |x: &i32| *x < 50);
        let result = seeded(200).check(&prop).unwrap();

        assert!(!result.passed);
        assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));
        assert_eq!(result.num_passed + result.num_failed, result.num_tests);
        assert_eq!(result.num_failed, 1);
        assert_eq!(result.shrink_outcome, Some(ShrinkOutcome::Minimized));
        assert_eq!(result.seed, 42);
        assert_eq!(result.draws, result.num_tests as u64);

        let record = result.failure.unwrap();
        assert_eq!(record.kind, FailureKind::PredicateFalse { message: None });
        assert_eq!(record.iteration, result.num_tests);
    }

    #[test]
    fn test_passing_property() {
        let prop = property("reverse involution", string(0, 20), |s: &String| {
            let reversed: String = s.chars().rev().collect();
            reversed.chars().rev().collect::<String>() == *s
        });
        let result = check(&prop).unwrap();

        assert!(result.passed);
        assert_eq!(result.num_tests, 100);
        assert_eq!(result.num_passed, 100);
        assert_eq!(result.num_failed, 0);
        assert!(result.raw_counterexample.is_none());
        assert!(result.shrunk_counterexample.is_none());
        assert!(result.failure.is_none());
    }

    #[test]
    fn test_exhaustive_mode_counts_failures() {
        let prop = property("small", int_range(0, 9), |x: &i32| *x < 5);
        let runner = Runner::builder().iterations(200).seed(7).exhaustive().build().unwrap();
        let result = runner.check(&prop).unwrap();

        assert!(!result.passed);
        assert_eq!(result.num_tests, 200);
        assert_eq!(result.num_passed + result.num_failed, 200);
        assert!(result.num_failed > 50 && result.num_failed < 150);
        assert_eq!(result.shrunk_counterexample.as_deref(), Some("5"));
    }

    #[test]
    fn test_panics_are_classified() {
        let prop = property("no big values", int_range(0, 1000), |x: &i32| {
            assert!(*x <= 10, "value {x} is too big");
            true
        });
        let result = seeded(100).check(&prop).unwrap();

        assert!(!result.passed);
        let record = result.failure.unwrap();
        assert!(record.kind.cause().unwrap().contains("too big"));
        // Every smaller failing candidate panics too, so none reproduces
        assert_eq!(result.shrink_steps, 0);
        assert_eq!(result.raw_counterexample, result.shrunk_counterexample);
    }

    #[test]
    fn test_panicking_failure_still_shrinks() {
        let prop = property("mixed", int_range(501, 1000).shrinkable(), |x: &i32| {
            assert!(*x <= 500, "value {x} is too big");
            *x < 50
        });
        let result = seeded(100).check(&prop).unwrap();

        assert!(!result.passed);
        let raw: i32 = result.raw_counterexample.as_deref().unwrap().parse().unwrap();
        assert!(raw > 500);
        let record = result.failure.unwrap();
        assert!(matches!(record.kind, FailureKind::PredicateException { .. }));
        assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));
        assert!(result.shrink_steps > 0);
        assert_eq!(result.shrink_outcome, Some(ShrinkOutcome::Minimized));
    }

    #[test]
    fn test_choice_shrinks_through_every_branch() {
        let prop = property(
            "one_of x<50",
            one_of(vec![int_range(0, 1000).boxed(), constant(700).boxed()]),
            |x: &i32| *x < 50,
        );
        let result = seeded(100).check(&prop).unwrap();
        assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));

        let prop = property(
            "frequency x<50",
            frequency(vec![(3, int_range(0, 1000).boxed()), (1, constant(700).boxed())]),
            |x: &i32| *x < 50,
        );
        let result = seeded(100).check(&prop).unwrap();
        assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));
    }

    #[test]
    fn test_generator_exhaustion_is_fatal() {
        let prop = property(
            "impossible",
            int_range(0, 10).filter(|x| *x > 10, 20),
            |_: &i32| true,
        );
        let error = seeded(10).check(&prop).unwrap_err();
        assert_eq!(
            error,
            PropertyError::GeneratorExhausted {
                property: "impossible".to_string(),
                attempts: 20,
                iteration: 1,
            }
        );
    }

    #[test]
    fn test_invalid_configuration() {
        let prop = property("any", constant(1), |_: &i32| true);
        let error = seeded(10).check_n(&prop, 0).unwrap_err();
        assert_eq!(error, PropertyError::Config(ConfigError::InvalidIterations(0)));

        assert!(Runner::builder().max_shrink_iterations(0).build().is_err());
    }

    #[test]
    fn test_seed_replays_failure() {
        let prop = property("x<900", int_range(0, 1000), |x: &i32| *x < 900);
        let first = Runner::new(TestConfig::default()).check(&prop).unwrap();
        assert!(!first.passed);

        let replay = Runner::new(TestConfig::default().with_seed(first.seed))
            .check(&prop)
            .unwrap();
        assert_eq!(replay.raw_counterexample, first.raw_counterexample);
        assert_eq!(replay.num_tests, first.num_tests);
    }

    #[test]
    fn test_check_n_overrides_iterations() {
        let prop = property("always", constant(0u8), |_: &u8| true);
        let result = seeded(100).check_n(&prop, 17).unwrap();
        assert_eq!(result.num_tests, 17);
        assert!(result.to_string().contains("passed 17 tests"));
    }

    #[test]
    fn test_step_budget_is_reported() {
        let prop = property("x<50", int_range(100, 1000), |x: &i32| *x < 50);
        let runner = Runner::new(
            TestConfig::default()
                .with_seed(3)
                .with_max_shrink_iterations(1),
        );
        let result = runner.check(&prop).unwrap();
        assert_eq!(result.shrink_steps, 1);
        assert_eq!(
            result.shrink_outcome,
            Some(ShrinkOutcome::StepBudgetExhausted)
        );
    }
}
