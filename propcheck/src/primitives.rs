//! Generators for primitive types and basic collections.
//!
//! Every primitive generator shrinks with the type's own candidate function,
//! keeping only candidates that stay inside the generator's domain.

use std::marker::PhantomData;

use num_traits::{Float, PrimInt};
use rand::Rng;
use rand::distributions::uniform::SampleUniform;

use crate::combinators::{Zip, Zip3, zip, zip3};
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::generator::Generator;
use crate::shrink::strategies;

/// Default alphabet for string generators
pub const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generator for integers uniformly distributed over `[min, max]`
#[derive(Debug, Clone)]
pub struct IntGenerator<T> {
    min: T,
    max: T,
}

impl<T: PrimInt> IntGenerator<T> {
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn new(min: T, max: T) -> Self {
        if min > max {
            panic!("IntGenerator requires min <= max");
        }
        Self { min, max }
    }

    /// A generator covering every value of the type
    pub fn full_range() -> Self {
        Self::new(T::min_value(), T::max_value())
    }
}

impl<T> Generator<T> for IntGenerator<T>
where
    T: PrimInt + SampleUniform + 'static,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        _config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        Ok(rng.gen_range(self.min..=self.max))
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let (min, max) = (self.min, self.max);
        Box::new(
            strategies::int_candidates(*value)
                .into_iter()
                .filter(move |candidate| min <= *candidate && *candidate <= max),
        )
    }
}

/// Integers uniformly distributed over `[min, max]`
pub fn int_range<T: PrimInt>(min: T, max: T) -> IntGenerator<T> {
    IntGenerator::new(min, max)
}

/// Sampling distribution of a [`RealGenerator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RealDistribution {
    /// Linear interpolation between the bounds
    Uniform,
    /// Centered on the midpoint with a standard deviation of a sixth of the range
    Normal,
    /// Inverse-CDF sampling from the lower bound
    Exponential { rate: f64 },
}

/// Generator for floating-point values within `[min, max]`
#[derive(Debug, Clone)]
pub struct RealGenerator<T> {
    min: T,
    max: T,
    distribution: RealDistribution,
}

impl<T: Float> RealGenerator<T> {
    /// # Panics
    ///
    /// Panics if the bounds are not ordered, or if an exponential rate is not
    /// positive.
    pub fn new(min: T, max: T, distribution: RealDistribution) -> Self {
        // Also rejects NaN bounds
        if !(min <= max) {
            panic!("RealGenerator requires min <= max");
        }
        if let RealDistribution::Exponential { rate } = distribution
            && !(rate > 0.0)
        {
            panic!("Exponential distribution requires a positive rate");
        }
        Self {
            min,
            max,
            distribution,
        }
    }

    fn sample(&self, rng: &mut dyn rand::RngCore) -> T {
        let (min, max) = (self.min, self.max);
        let range = max - min;
        let two = T::one() + T::one();

        let value = match self.distribution {
            RealDistribution::Uniform => min + unit::<T>(rng) * range,
            RealDistribution::Normal => {
                // Box-Muller; the first uniform is kept away from zero for ln
                let u1 = T::one() - unit::<T>(rng);
                let u2 = unit::<T>(rng);
                let z = (-two * u1.ln()).sqrt() * (two * cast::<T>(std::f64::consts::PI) * u2).cos();
                let mean = min + range / two;
                let std_dev = range / cast(6.0);
                mean + z * std_dev
            }
            RealDistribution::Exponential { rate } => {
                let u = unit::<T>(rng);
                min + (-(T::one() - u).ln()) / cast(rate)
            }
        };

        // Float::max/min discard NaN, so degenerate ranges collapse onto the bounds
        value.max(min).min(max)
    }
}

fn cast<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

fn unit<T: Float>(rng: &mut dyn rand::RngCore) -> T {
    cast(rng.r#gen::<f64>())
}

impl<T> Generator<T> for RealGenerator<T>
where
    T: Float + 'static,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        _config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        Ok(self.sample(rng))
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let (min, max) = (self.min, self.max);
        Box::new(
            strategies::float_candidates(*value)
                .into_iter()
                .filter(move |candidate| min <= *candidate && *candidate <= max),
        )
    }
}

/// Floating-point values within `[min, max]` drawn from `distribution`
pub fn real<T: Float>(min: T, max: T, distribution: RealDistribution) -> RealGenerator<T> {
    RealGenerator::new(min, max, distribution)
}

/// Floating-point values uniformly distributed over `[min, max]`
pub fn real_uniform<T: Float>(min: T, max: T) -> RealGenerator<T> {
    RealGenerator::new(min, max, RealDistribution::Uniform)
}

/// Generator for boolean values
#[derive(Debug, Clone)]
pub struct BoolGenerator {
    probability: f64,
}

impl BoolGenerator {
    /// # Panics
    ///
    /// Panics unless `0.0 <= probability <= 1.0`.
    pub fn new(probability: f64) -> Self {
        if !(0.0..=1.0).contains(&probability) {
            panic!("BoolGenerator probability must be within [0, 1]");
        }
        Self { probability }
    }
}

impl Generator<bool> for BoolGenerator {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        _config: &GeneratorConfig,
    ) -> Result<bool, GenerationError> {
        Ok(rng.gen_bool(self.probability))
    }

    fn shrink(&self, value: &bool) -> Box<dyn Iterator<Item = bool>> {
        Box::new(strategies::bool_candidates(*value).into_iter())
    }
}

/// Fair coin flips
pub fn booleans() -> BoolGenerator {
    BoolGenerator::new(0.5)
}

/// `true` with the given probability
pub fn bool_with(probability: f64) -> BoolGenerator {
    BoolGenerator::new(probability)
}

/// Generator for characters drawn from a fixed alphabet
#[derive(Debug, Clone)]
pub struct CharGenerator {
    alphabet: Vec<char>,
}

impl CharGenerator {
    /// # Panics
    ///
    /// Panics if `alphabet` is empty.
    pub fn new(alphabet: &str) -> Self {
        let alphabet: Vec<char> = alphabet.chars().collect();
        if alphabet.is_empty() {
            panic!("CharGenerator requires a non-empty alphabet");
        }
        Self { alphabet }
    }

    fn pick(&self, rng: &mut dyn rand::RngCore) -> char {
        self.alphabet[rng.gen_range(0..self.alphabet.len())]
    }

    /// First character of the alphabet; shrinking substitutes toward it
    fn simplest(&self) -> char {
        self.alphabet[0]
    }
}

impl Generator<char> for CharGenerator {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        _config: &GeneratorConfig,
    ) -> Result<char, GenerationError> {
        Ok(self.pick(rng))
    }

    fn shrink(&self, value: &char) -> Box<dyn Iterator<Item = char>> {
        Box::new(strategies::char_candidates_toward(*value, self.simplest()).into_iter())
    }
}

/// Characters drawn uniformly from `alphabet`
pub fn chars(alphabet: &str) -> CharGenerator {
    CharGenerator::new(alphabet)
}

/// Generator for strings with a bounded length
#[derive(Debug, Clone)]
pub struct StringGenerator {
    chars: CharGenerator,
    min_len: usize,
    max_len: usize,
}

impl StringGenerator {
    /// # Panics
    ///
    /// Panics if `min_len > max_len` or the alphabet is empty.
    pub fn new(min_len: usize, max_len: usize, alphabet: &str) -> Self {
        if min_len > max_len {
            panic!("StringGenerator requires min_len <= max_len");
        }
        Self {
            chars: CharGenerator::new(alphabet),
            min_len,
            max_len,
        }
    }
}

impl Generator<String> for StringGenerator {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        _config: &GeneratorConfig,
    ) -> Result<String, GenerationError> {
        let length = rng.gen_range(self.min_len..=self.max_len);
        Ok((0..length).map(|_| self.chars.pick(rng)).collect())
    }

    fn shrink(&self, value: &String) -> Box<dyn Iterator<Item = String>> {
        let min_len = self.min_len;
        Box::new(
            strategies::string_candidates_toward(value, self.chars.simplest())
                .into_iter()
                .filter(move |candidate| candidate.chars().count() >= min_len),
        )
    }
}

/// Alphanumeric strings with a length in `[min_len, max_len]`
pub fn string(min_len: usize, max_len: usize) -> StringGenerator {
    StringGenerator::new(min_len, max_len, ALPHANUMERIC)
}

/// Strings over `alphabet` with a length in `[min_len, max_len]`
pub fn string_with_alphabet(min_len: usize, max_len: usize, alphabet: &str) -> StringGenerator {
    StringGenerator::new(min_len, max_len, alphabet)
}

/// Generator for `Vec<T>` collections
#[derive(Debug, Clone)]
pub struct VecGenerator<G, T> {
    element: G,
    min_size: usize,
    max_size: usize,
    _phantom: PhantomData<fn() -> T>,
}

impl<G, T> VecGenerator<G, T>
where
    G: Generator<T>,
{
    /// # Panics
    ///
    /// Panics if `min_size > max_size`.
    pub fn new(element: G, min_size: usize, max_size: usize) -> Self {
        if min_size > max_size {
            panic!("VecGenerator requires min_size <= max_size");
        }
        Self {
            element,
            min_size,
            max_size,
            _phantom: PhantomData,
        }
    }
}

impl<G, T> Generator<Vec<T>> for VecGenerator<G, T>
where
    G: Generator<T>,
    T: Clone + 'static,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<Vec<T>, GenerationError> {
        let length = rng.gen_range(self.min_size..=self.max_size);
        (0..length)
            .map(|_| self.element.generate(rng, config))
            .collect()
    }

    fn shrink(&self, value: &Vec<T>) -> Box<dyn Iterator<Item = Vec<T>>> {
        let min_size = self.min_size;
        let candidates =
            strategies::list_candidates(value, |element| self.element.shrink(element).collect());
        Box::new(
            candidates
                .into_iter()
                .filter(move |candidate| candidate.len() >= min_size),
        )
    }
}

/// Lists with a length in `[min_size, max_size]` and independent elements
pub fn list<G, T>(element: G, min_size: usize, max_size: usize) -> VecGenerator<G, T>
where
    G: Generator<T>,
{
    VecGenerator::new(element, min_size, max_size)
}

/// Pairs of independently drawn components
pub fn tuple2<A, B, TA, TB>(first: A, second: B) -> Zip<A, B, TA, TB>
where
    A: Generator<TA>,
    B: Generator<TB>,
{
    zip(first, second)
}

/// Triples of independently drawn components
pub fn tuple3<A, B, C, TA, TB, TC>(first: A, second: B, third: C) -> Zip3<A, B, C, TA, TB, TC>
where
    A: Generator<TA>,
    B: Generator<TB>,
    C: Generator<TC>,
{
    zip3(first, second, third)
}
