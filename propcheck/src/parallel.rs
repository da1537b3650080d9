//! Tally-only parallel trial execution.
//!
//! Trials are split across scoped worker threads, each owning a stream seeded
//! from the run seed and its worker index. Failures are counted but never
//! shrunk, so the single-stream guarantees of [`Runner::check`] are untouched.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::PropertyError;
use crate::property::{Property, panic_message};
use crate::rng::{ValueSource, derive_worker_seed, resolve_seed};
use crate::runner::Runner;

/// Configuration for parallel execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub num_threads: usize,
    /// When false, every trial runs on the calling thread
    pub enabled: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            enabled: true,
        }
    }
}

impl ParallelConfig {
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads,
            enabled: true,
        }
    }

    pub fn sequential() -> Self {
        Self {
            num_threads: 1,
            enabled: false,
        }
    }

    fn workers(&self, num_tests: usize) -> usize {
        if self.enabled {
            self.num_threads.clamp(1, num_tests.max(1))
        } else {
            1
        }
    }
}

/// Counts from a tally run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TallyReport {
    pub property_name: String,
    pub num_tests: usize,
    pub num_passed: usize,
    pub num_failed: usize,
    /// Debug rendering of the failing input seen first by the lowest-numbered worker
    pub first_failure: Option<String>,
    pub seed: u64,
    pub duration: Duration,
}

impl TallyReport {
    /// Fraction of trials that failed
    pub fn failure_rate(&self) -> f64 {
        if self.num_tests == 0 {
            0.0
        } else {
            self.num_failed as f64 / self.num_tests as f64
        }
    }
}

#[derive(Debug, Default)]
struct WorkerTally {
    passed: usize,
    failed: usize,
    first_failure: Option<String>,
}

impl Runner {
    /// Run the configured number of trials across worker threads, counting
    /// failures without shrinking them.
    pub fn tally<T>(
        &self,
        property: &Property<T>,
        parallel: &ParallelConfig,
    ) -> Result<TallyReport, PropertyError>
    where
        T: fmt::Debug + 'static,
    {
        let config = self.config();
        config.validate()?;

        let start_time = Instant::now();
        let num_tests = config.iterations;
        let seed = resolve_seed(config.seed);
        let workers = parallel.workers(num_tests);
        let per_worker = num_tests / workers;
        let remainder = num_tests % workers;
        tracing::debug!(property = property.name(), seed, workers, num_tests, "starting tally");

        let outcomes = crossbeam::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let trials = per_worker + usize::from(worker < remainder);
                    let generator_config = config.generator_config.clone();
                    scope.spawn(move |_| {
                        let mut source = ValueSource::new(
                            property.generator().clone(),
                            generator_config,
                            derive_worker_seed(seed, worker),
                        );
                        let mut tally = WorkerTally::default();
                        for trial in 1..=trials {
                            let input = source.next().map_err(|error| {
                                PropertyError::from_generation(error, property.name(), trial)
                            })?;
                            match property.evaluate(&input) {
                                Ok(()) => tally.passed += 1,
                                Err(_) => {
                                    tally.failed += 1;
                                    if tally.first_failure.is_none() {
                                        tally.first_failure = Some(format!("{input:?}"));
                                    }
                                }
                            }
                        }
                        tracing::trace!(worker, passed = tally.passed, failed = tally.failed, "worker done");
                        Ok::<_, PropertyError>(tally)
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| {
                    handle.join().unwrap_or_else(|payload| {
                        Err(PropertyError::WorkerPanicked {
                            worker,
                            message: panic_message(payload.as_ref()),
                        })
                    })
                })
                .collect::<Vec<_>>()
        })
        .map_err(|payload| PropertyError::WorkerPanicked {
            worker: 0,
            message: panic_message(payload.as_ref()),
        })?;

        let mut report = TallyReport {
            property_name: property.name().to_string(),
            num_tests: 0,
            num_passed: 0,
            num_failed: 0,
            first_failure: None,
            seed,
            duration: Duration::ZERO,
        };
        for outcome in outcomes {
            let tally = outcome?;
            report.num_passed += tally.passed;
            report.num_failed += tally.failed;
            if report.first_failure.is_none() {
                report.first_failure = tally.first_failure;
            }
        }
        report.num_tests = report.num_passed + report.num_failed;
        report.duration = start_time.elapsed();

        tracing::debug!(
            property = property.name(),
            passed = report.num_passed,
            failed = report.num_failed,
            "tally finished"
        );
        Ok(report)
    }
}
