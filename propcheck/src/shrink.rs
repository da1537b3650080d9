//! Shrinking functionality for minimizing failing test cases.
//!
//! Every supported type has a candidate function producing a finite, ordered
//! list of strictly simpler values, empty at the type's minimal element. The
//! [`ShrinkEngine`] walks those candidates greedily, adopting the first one
//! that still fails.

use std::time::{Duration, Instant};

use crate::error::PropertyError;
use crate::property::guarded;

/// Trait for types that can be shrunk to smaller values
pub trait Shrinkable: Sized {
    /// Create an iterator of shrunk values, in trial order
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>>;
}

/// Why a shrink search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShrinkOutcome {
    /// No candidate of the final value reproduces the failure
    Minimized,
    /// The step budget ran out before a local minimum was reached
    StepBudgetExhausted,
    /// The wall-clock budget ran out
    TimedOut,
}

/// Result of a shrinking operation
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// Original value that failed
    pub original: T,
    /// Minimal value that still fails
    pub minimal: T,
    /// Number of adopted candidates
    pub shrink_steps: usize,
    /// Time spent shrinking
    pub shrink_duration: Duration,
    /// Why the search stopped
    pub outcome: ShrinkOutcome,
}

impl<T> ShrinkResult<T> {
    pub fn new(
        original: T,
        minimal: T,
        shrink_steps: usize,
        shrink_duration: Duration,
        outcome: ShrinkOutcome,
    ) -> Self {
        Self {
            original,
            minimal,
            shrink_steps,
            shrink_duration,
            outcome,
        }
    }

    /// Whether the search reached a local minimum
    pub fn completed(&self) -> bool {
        self.outcome == ShrinkOutcome::Minimized
    }
}

/// Configuration for shrinking behavior
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkConfig {
    /// Maximum number of adopted candidates
    pub max_iterations: usize,
    /// Wall-clock budget for the whole search
    pub timeout: Duration,
    /// Log every adopted step at info level
    pub verbose: bool,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            timeout: Duration::from_secs(10),
            verbose: false,
        }
    }
}

impl ShrinkConfig {
    pub fn new(max_iterations: usize, timeout: Duration, verbose: bool) -> Self {
        Self {
            max_iterations,
            timeout,
            verbose,
        }
    }

    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..Default::default()
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Greedy first-improvement minimizer
#[derive(Debug, Clone, Default)]
pub struct ShrinkEngine {
    config: ShrinkConfig,
}

impl ShrinkEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ShrinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShrinkConfig {
        &self.config
    }

    /// Shrink a value using its type's own candidate function
    pub fn shrink<T, P>(&self, value: T, property: P) -> ShrinkResult<T>
    where
        T: Shrinkable + Clone,
        P: Fn(&T) -> Result<(), PropertyError>,
    {
        self.shrink_with(value, property, |current: &T| current.shrink())
    }

    /// Shrink a value using an explicit candidate function.
    ///
    /// `value` is taken to be a failing input however it failed, so its
    /// candidates are searched even when it raised. A candidate reproduces the
    /// failure only when `property` returns [`PropertyError::PredicateFalse`];
    /// any other error, and any panic, skips the candidate.
    pub fn shrink_with<T, P, S>(&self, value: T, property: P, candidates: S) -> ShrinkResult<T>
    where
        T: Clone,
        P: Fn(&T) -> Result<(), PropertyError>,
        S: Fn(&T) -> Box<dyn Iterator<Item = T>>,
    {
        let start_time = Instant::now();
        let timeout = self.config.timeout;
        let still_fails = |candidate: &T| match guarded(|| property(candidate)) {
            Err(error) => error.is_predicate_false(),
            Ok(()) => false,
        };

        let mut current = value.clone();
        let mut shrink_steps = 0;

        let outcome = 'search: loop {
            if shrink_steps >= self.config.max_iterations {
                break ShrinkOutcome::StepBudgetExhausted;
            }
            if start_time.elapsed() >= timeout {
                break ShrinkOutcome::TimedOut;
            }

            let mut adopted = None;
            for (index, candidate) in candidates(&current).enumerate() {
                if start_time.elapsed() >= timeout {
                    break 'search ShrinkOutcome::TimedOut;
                }
                tracing::trace!(step = shrink_steps, candidate = index, "evaluating candidate");
                if still_fails(&candidate) {
                    adopted = Some(candidate);
                    break;
                }
            }

            match adopted {
                Some(candidate) => {
                    current = candidate;
                    shrink_steps += 1;
                    if self.config.verbose {
                        tracing::info!(step = shrink_steps, "found smaller failing value");
                    }
                }
                None => break ShrinkOutcome::Minimized,
            }
        };

        match outcome {
            ShrinkOutcome::TimedOut => tracing::warn!(
                steps = shrink_steps,
                timeout_ms = timeout.as_millis() as u64,
                "shrinking timed out"
            ),
            _ => tracing::debug!(steps = shrink_steps, ?outcome, "shrinking finished"),
        }

        ShrinkResult::new(
            value,
            current,
            shrink_steps,
            start_time.elapsed(),
            outcome,
        )
    }
}

/// Candidate functions for the built-in types
pub mod strategies {
    use std::collections::HashSet;

    use num_traits::{Float, PrimInt};

    /// The simplest character, used for string substitutions
    pub const SIMPLEST_CHAR: char = 'a';

    fn push_unique<T: PartialEq>(candidates: &mut Vec<T>, candidate: T) {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }

    /// `0`, then `v/2, v/4, ...`, then the neighbour one step toward zero.
    ///
    /// Empty once `|v| <= 1`.
    pub fn int_candidates<T: PrimInt>(value: T) -> Vec<T> {
        let zero = T::zero();
        let one = T::one();
        let mut candidates = Vec::new();

        // -1 is detected without subtracting so unsigned types never underflow
        if value == zero || value == one || value.checked_add(&one) == Some(zero) {
            return candidates;
        }

        candidates.push(zero);

        let two = one + one;
        let mut halved = value / two;
        while halved != zero {
            push_unique(&mut candidates, halved);
            halved = halved / two;
        }

        let neighbour = if value > zero {
            value - one
        } else {
            value + one
        };
        push_unique(&mut candidates, neighbour);

        candidates
    }

    /// `0.0`, `trunc(v)`, `round(v)`, then halving while `|x| >= 0.001`.
    ///
    /// Only candidates strictly closer to zero are kept. NaN and infinities
    /// shrink straight to `0.0`.
    pub fn float_candidates<T: Float>(value: T) -> Vec<T> {
        let zero = T::zero();
        if value.is_nan() || value.is_infinite() {
            return vec![zero];
        }
        if value == zero {
            return Vec::new();
        }

        let magnitude = value.abs();
        let mut candidates = Vec::new();
        for candidate in [zero, value.trunc(), value.round()] {
            if candidate.abs() < magnitude {
                push_unique(&mut candidates, candidate);
            }
        }

        let two = T::one() + T::one();
        let threshold = T::from(0.001).unwrap_or_else(T::epsilon);
        let mut halved = value / two;
        while halved.abs() >= threshold {
            push_unique(&mut candidates, halved);
            halved = halved / two;
        }

        candidates
    }

    pub fn bool_candidates(value: bool) -> Vec<bool> {
        if value { vec![false] } else { Vec::new() }
    }

    pub fn char_candidates(value: char) -> Vec<char> {
        char_candidates_toward(value, SIMPLEST_CHAR)
    }

    /// `[simplest]` unless `value` already is `simplest`
    pub fn char_candidates_toward(value: char, simplest: char) -> Vec<char> {
        if value == simplest {
            Vec::new()
        } else {
            vec![simplest]
        }
    }

    /// `""`, proper prefixes (shortest first), single-character deletions,
    /// then single-character substitutions by [`SIMPLEST_CHAR`].
    pub fn string_candidates(value: &str) -> Vec<String> {
        string_candidates_toward(value, SIMPLEST_CHAR)
    }

    /// [`string_candidates`] with substitutions by `simplest`
    pub fn string_candidates_toward(value: &str, simplest: char) -> Vec<String> {
        let chars: Vec<char> = value.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut push = |candidate: String| {
            if seen.insert(candidate.clone()) {
                candidates.push(candidate);
            }
        };

        push(String::new());
        for len in 1..chars.len() {
            push(chars[..len].iter().collect());
        }
        for skip in 0..chars.len() {
            push(
                chars
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| *index != skip)
                    .map(|(_, c)| *c)
                    .collect(),
            );
        }
        for (index, c) in chars.iter().enumerate() {
            if *c != simplest {
                let mut substituted = chars.clone();
                substituted[index] = simplest;
                push(substituted.into_iter().collect());
            }
        }

        candidates
    }

    /// `[]`, proper prefixes, single-element deletions, then every variant
    /// with one element replaced by one of that element's candidates.
    pub fn list_candidates<T, F>(values: &[T], element_candidates: F) -> Vec<Vec<T>>
    where
        T: Clone,
        F: Fn(&T) -> Vec<T>,
    {
        if values.is_empty() {
            return Vec::new();
        }

        let len = values.len();
        let mut candidates = vec![Vec::new()];
        for prefix in 1..len {
            candidates.push(values[..prefix].to_vec());
        }
        // Deleting the last element duplicates the longest prefix (or `[]`)
        for skip in 0..len - 1 {
            let mut deleted = values.to_vec();
            deleted.remove(skip);
            candidates.push(deleted);
        }
        for (index, element) in values.iter().enumerate() {
            for replacement in element_candidates(element) {
                let mut replaced = values.to_vec();
                replaced[index] = replacement;
                candidates.push(replaced);
            }
        }

        candidates
    }

    /// First-component candidates, second-component candidates, then the
    /// cross product of both.
    pub fn pair_candidates<A, B, FA, FB>(value: &(A, B), first: FA, second: FB) -> Vec<(A, B)>
    where
        A: Clone,
        B: Clone,
        FA: Fn(&A) -> Vec<A>,
        FB: Fn(&B) -> Vec<B>,
    {
        let (a, b) = value;
        let firsts = first(a);
        let seconds = second(b);

        let mut candidates = Vec::with_capacity(
            firsts.len() + seconds.len() + firsts.len() * seconds.len(),
        );
        candidates.extend(firsts.iter().map(|fa| (fa.clone(), b.clone())));
        candidates.extend(seconds.iter().map(|sb| (a.clone(), sb.clone())));
        for fa in &firsts {
            for sb in &seconds {
                candidates.push((fa.clone(), sb.clone()));
            }
        }
        candidates
    }

    /// Component-wise candidates for triples
    pub fn triple_candidates<A, B, C, FA, FB, FC>(
        value: &(A, B, C),
        first: FA,
        second: FB,
        third: FC,
    ) -> Vec<(A, B, C)>
    where
        A: Clone,
        B: Clone,
        C: Clone,
        FA: Fn(&A) -> Vec<A>,
        FB: Fn(&B) -> Vec<B>,
        FC: Fn(&C) -> Vec<C>,
    {
        let (a, b, c) = value;
        let mut candidates: Vec<(A, B, C)> = first(a)
            .into_iter()
            .map(|fa| (fa, b.clone(), c.clone()))
            .collect();
        candidates.extend(second(b).into_iter().map(|sb| (a.clone(), sb, c.clone())));
        candidates.extend(third(c).into_iter().map(|tc| (a.clone(), b.clone(), tc)));
        candidates
    }
}

macro_rules! impl_shrinkable_int {
    ($($t:ty),*) => {
        $(
            impl Shrinkable for $t {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    Box::new(strategies::int_candidates(*self).into_iter())
                }
            }
        )*
    };
}

macro_rules! impl_shrinkable_float {
    ($($t:ty),*) => {
        $(
            impl Shrinkable for $t {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    Box::new(strategies::float_candidates(*self).into_iter())
                }
            }
        )*
    };
}

impl_shrinkable_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_shrinkable_float!(f32, f64);

impl Shrinkable for bool {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(strategies::bool_candidates(*self).into_iter())
    }
}

impl Shrinkable for char {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(strategies::char_candidates(*self).into_iter())
    }
}

impl Shrinkable for String {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(strategies::string_candidates(self).into_iter())
    }
}

impl<T: Shrinkable + Clone + 'static> Shrinkable for Vec<T> {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let candidates = strategies::list_candidates(self, |element| element.shrink().collect());
        Box::new(candidates.into_iter())
    }
}

impl<T: Shrinkable + Clone + 'static> Shrinkable for Option<T> {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            None => Box::new(std::iter::empty()),
            Some(inner) => Box::new(std::iter::once(None).chain(inner.shrink().map(Some))),
        }
    }
}

impl<A, B> Shrinkable for (A, B)
where
    A: Shrinkable + Clone + 'static,
    B: Shrinkable + Clone + 'static,
{
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let candidates = strategies::pair_candidates(
            self,
            |a| a.shrink().collect(),
            |b| b.shrink().collect(),
        );
        Box::new(candidates.into_iter())
    }
}

impl<A, B, C> Shrinkable for (A, B, C)
where
    A: Shrinkable + Clone + 'static,
    B: Shrinkable + Clone + 'static,
    C: Shrinkable + Clone + 'static,
{
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let candidates = strategies::triple_candidates(
            self,
            |a| a.shrink().collect(),
            |b| b.shrink().collect(),
            |c| c.shrink().collect(),
        );
        Box::new(candidates.into_iter())
    }
}

/// All candidates of `value`, in trial order
pub fn shrink<T: Shrinkable>(value: &T) -> Vec<T> {
    value.shrink().collect()
}

/// Minimize `value` against a boolean predicate, returning the minimized value
/// and the number of steps taken.
///
/// `predicate` returning false means "still failing". Panics reject the
/// candidate. The default shrink timeout applies.
pub fn shrink_failure<T, F>(value: T, predicate: F, max_steps: usize) -> (T, usize)
where
    T: Shrinkable + Clone,
    F: Fn(&T) -> bool,
{
    let engine = ShrinkEngine::with_config(ShrinkConfig::with_max_iterations(max_steps));
    let result = engine.shrink(value, |candidate: &T| {
        if predicate(candidate) {
            Ok(())
        } else {
            Err(PropertyError::predicate_false())
        }
    });
    (result.minimal, result.shrink_steps)
}
