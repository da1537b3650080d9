#![allow(clippy::result_large_err)]

//! # propcheck - Property-Based Testing for Rust
//!
//! propcheck generates pseudorandom inputs from composable generators, checks a
//! predicate against each of them and shrinks the first failing input to a
//! small counterexample.
//!
//! ## Quick Start
//!
//! ```rust
//! use propcheck::{Runner, TestConfig, int_range, property};
//!
//! let prop = property("below fifty", int_range(0, 1000), |x: &i32| *x < 50);
//! let runner = Runner::new(TestConfig::default().with_iterations(200).with_seed(7));
//! let result = runner.check(&prop).unwrap();
//!
//! assert!(!result.passed);
//! assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));
//! ```
//!
//! Generators compose without looking inside each other:
//!
//! ```rust
//! use propcheck::{Generator, check, int_range, list, property, string};
//!
//! let pairs = list(int_range(0u8, 9), 0, 5).zip(string(1, 8));
//! let prop = property("lengths", pairs, |(values, text): &(Vec<u8>, String)| {
//!     values.len() <= 5 && !text.is_empty()
//! });
//! assert!(check(&prop).unwrap().passed);
//! ```
//!
//! Shrinking can also be driven directly:
//!
//! ```rust
//! use propcheck::{shrink, shrink_failure};
//!
//! assert!(shrink(&0i32).is_empty());
//! assert_eq!(shrink(&true), vec![false]);
//! assert_eq!(shrink_failure(1000, |x: &i32| *x < 50, 100), (50, 16));
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod combinators;
pub mod config;
pub mod error;
pub mod generator;
pub mod parallel;
pub mod primitives;
pub mod property;
pub mod rng;
pub mod runner;
pub mod shrink;

pub use combinators::{
    DEFAULT_MAX_RETRIES, Filter, Frequency, HasLen, Map, OneOf, Recursive, Resize,
    SizedGenerator, TypeShrink, Zip, Zip3, frequency, non_empty, one_of, recursive, resize,
    shrinkable, sized, zip, zip3,
};
pub use config::{ConfigError, GeneratorConfig, RunMode, TestConfig};
pub use error::{FailureKind, GenerationError, PropertyError};
pub use generator::{
    BoxedGenerator, ConstantGenerator, ElementsGenerator, FnGenerator, Generator, constant,
    elements, from_fn,
};
pub use parallel::{ParallelConfig, TallyReport};
pub use primitives::{
    ALPHANUMERIC, BoolGenerator, CharGenerator, IntGenerator, RealDistribution, RealGenerator,
    StringGenerator, VecGenerator, bool_with, booleans, chars, int_range, list, real, real_uniform,
    string, string_with_alphabet, tuple2, tuple3,
};
pub use property::{Fallible, Predicate, Property, fallible, property, property_with};
pub use rng::ValueSource;
pub use runner::{FailureRecord, Runner, RunnerBuilder, TestResult, check, check_with_config};
pub use shrink::{
    ShrinkConfig, ShrinkEngine, ShrinkOutcome, ShrinkResult, Shrinkable, shrink, shrink_failure,
};
