//! Configuration types for controlling test behavior and generation parameters.

use std::time::Duration;

use thiserror::Error;

use crate::shrink::ShrinkConfig;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid number of iterations (must be > 0)
    #[error("Invalid iterations count: {0} (must be > 0)")]
    InvalidIterations(usize),
    /// Invalid number of shrink iterations (must be > 0)
    #[error("Invalid shrink iterations count: {0} (must be > 0)")]
    InvalidShrinkIterations(usize),
    /// Invalid timeout (must be > 0)
    #[error("Invalid timeout (must be > 0)")]
    InvalidTimeout,
    /// Invalid max depth (must be > 0)
    #[error("Invalid max depth: {0} (must be > 0)")]
    InvalidMaxDepth(usize),
    /// Invalid size hint (must be > 0)
    #[error("Invalid size hint: {0} (must be > 0)")]
    InvalidSizeHint(usize),
}

/// Configuration handed to generators on every draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Size read by `sized` generators
    pub size_hint: usize,
    /// Upper bound on the nesting of `recursive` generators
    pub max_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size_hint: 10,
            max_depth: 5,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator configuration with validation
    pub fn new(size_hint: usize, max_depth: usize) -> Result<Self, ConfigError> {
        let config = Self {
            size_hint,
            max_depth,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_hint == 0 {
            return Err(ConfigError::InvalidSizeHint(self.size_hint));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        Ok(())
    }

    /// Return a copy with a different size hint
    pub fn with_size_hint(mut self, size_hint: usize) -> Self {
        self.size_hint = size_hint;
        self
    }

    /// Return a copy with a different maximum depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// How the runner reacts to a failing trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Stop at the first failing trial and shrink it
    #[default]
    ShortCircuit,
    /// Run every trial to measure the failure rate; only the first failure is shrunk
    Exhaustive,
}

/// Configuration for individual property checks
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    /// Number of trials to run
    pub iterations: usize,
    /// Maximum number of adopted shrink steps
    pub max_shrink_iterations: usize,
    /// Wall-clock budget for shrinking
    pub shrink_timeout: Duration,
    /// Log every shrink step at info level
    pub verbose: bool,
    /// Optional seed for reproducible runs
    pub seed: Option<u64>,
    /// Short-circuit or exhaustive trial loop
    pub mode: RunMode,
    /// Generator configuration overrides
    pub generator_config: GeneratorConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_shrink_iterations: 1000,
            shrink_timeout: Duration::from_secs(10),
            verbose: false,
            seed: None,
            mode: RunMode::ShortCircuit,
            generator_config: GeneratorConfig::default(),
        }
    }
}

impl TestConfig {
    /// Create a new test configuration with validation
    pub fn new(
        iterations: usize,
        max_shrink_iterations: usize,
        shrink_timeout: Duration,
        seed: Option<u64>,
        generator_config: GeneratorConfig,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            iterations,
            max_shrink_iterations,
            shrink_timeout,
            seed,
            generator_config,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the test configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations(self.iterations));
        }
        if self.max_shrink_iterations == 0 {
            return Err(ConfigError::InvalidShrinkIterations(
                self.max_shrink_iterations,
            ));
        }
        if self.shrink_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        self.generator_config.validate()?;
        Ok(())
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_shrink_iterations(mut self, max_shrink_iterations: usize) -> Self {
        self.max_shrink_iterations = max_shrink_iterations;
        self
    }

    pub fn with_shrink_timeout(mut self, shrink_timeout: Duration) -> Self {
        self.shrink_timeout = shrink_timeout;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_generator_config(mut self, generator_config: GeneratorConfig) -> Self {
        self.generator_config = generator_config;
        self
    }

    /// Enable verbose shrink logging
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Derive the shrinking configuration used for failures found under this config
    pub fn shrink_config(&self) -> ShrinkConfig {
        ShrinkConfig::new(
            self.max_shrink_iterations,
            self.shrink_timeout,
            self.verbose,
        )
    }
}
