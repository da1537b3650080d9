//! Combinators that build new generators out of existing ones.
//!
//! None of these inspect the internals of the generators they wrap: they only
//! call `generate` and `shrink` through the [`Generator`] trait.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::generator::{BoxedGenerator, Generator};
use crate::shrink::{Shrinkable, strategies};

/// Retry budget used by [`non_empty`] and [`Generator::non_empty`]
pub const DEFAULT_MAX_RETRIES: usize = 1000;

/// A generator that maps values from one type to another.
///
/// The output domain is whatever `f` produces; mapped values are not shrunk.
pub struct Map<G, F, T> {
    generator: G,
    mapper: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<G, F, T> Map<G, F, T> {
    pub fn new(generator: G, mapper: F) -> Self {
        Self {
            generator,
            mapper,
            _phantom: PhantomData,
        }
    }
}

impl<G: Clone, F: Clone, T> Clone for Map<G, F, T> {
    fn clone(&self) -> Self {
        Self::new(self.generator.clone(), self.mapper.clone())
    }
}

impl<G, F, T, U> Generator<U> for Map<G, F, T>
where
    G: Generator<T>,
    F: Fn(T) -> U,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<U, GenerationError> {
        self.generator.generate(rng, config).map(&self.mapper)
    }
}

/// A generator that only yields values accepted by a predicate
pub struct Filter<G, F, T> {
    generator: G,
    predicate: F,
    max_retries: usize,
    _phantom: PhantomData<fn() -> T>,
}

impl<G, F, T> Filter<G, F, T> {
    pub fn new(generator: G, predicate: F, max_retries: usize) -> Self {
        Self {
            generator,
            predicate,
            max_retries,
            _phantom: PhantomData,
        }
    }
}

impl<G: Clone, F: Clone, T> Clone for Filter<G, F, T> {
    fn clone(&self) -> Self {
        Self::new(
            self.generator.clone(),
            self.predicate.clone(),
            self.max_retries,
        )
    }
}

impl<G, F, T> Generator<T> for Filter<G, F, T>
where
    G: Generator<T>,
    F: Fn(&T) -> bool + Clone + 'static,
    T: 'static,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        for _ in 0..self.max_retries {
            let value = self.generator.generate(rng, config)?;
            if (self.predicate)(&value) {
                return Ok(value);
            }
        }
        tracing::debug!("filter rejected {} consecutive draws", self.max_retries);
        Err(GenerationError::Exhausted {
            attempts: self.max_retries,
        })
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let predicate = self.predicate.clone();
        Box::new(
            self.generator
                .shrink(value)
                .filter(move |candidate| predicate(candidate)),
        )
    }
}

/// A generator whose values shrink with their type's own candidate function.
///
/// The inner generator's candidates are ignored, so shrinking is not held to
/// its domain. Useful after `map` or `from_fn`, which do not shrink.
pub struct TypeShrink<G, T> {
    generator: G,
    _phantom: PhantomData<fn() -> T>,
}

impl<G, T> TypeShrink<G, T> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            _phantom: PhantomData,
        }
    }
}

impl<G: Clone, T> Clone for TypeShrink<G, T> {
    fn clone(&self) -> Self {
        Self::new(self.generator.clone())
    }
}

impl<G, T> Generator<T> for TypeShrink<G, T>
where
    G: Generator<T>,
    T: Shrinkable + 'static,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        self.generator.generate(rng, config)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        Shrinkable::shrink(value)
    }
}

/// Shrink values drawn from `generator` with [`Shrinkable`]
pub fn shrinkable<G, T>(generator: G) -> TypeShrink<G, T>
where
    G: Generator<T>,
    T: Shrinkable,
{
    TypeShrink::new(generator)
}

/// Collections that can be tested for emptiness
pub trait HasLen {
    fn len(&self) -> usize;

    fn is_non_empty(&self) -> bool {
        self.len() > 0
    }
}

impl<T> HasLen for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl HasLen for String {
    fn len(&self) -> usize {
        self.chars().count()
    }
}

/// Reject empty collections drawn from `generator`
pub fn non_empty<G, T>(generator: G) -> Filter<G, fn(&T) -> bool, T>
where
    G: Generator<T>,
    T: HasLen,
{
    generator.non_empty()
}

/// A generator that combines two generators to produce pairs
#[derive(Clone)]
pub struct Zip<A, B, TA, TB> {
    left: A,
    right: B,
    _phantom: PhantomData<fn() -> (TA, TB)>,
}

impl<A, B, TA, TB> Zip<A, B, TA, TB> {
    pub fn new(left: A, right: B) -> Self {
        Self {
            left,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<A, B, TA, TB> Generator<(TA, TB)> for Zip<A, B, TA, TB>
where
    A: Generator<TA>,
    B: Generator<TB>,
    TA: Clone + 'static,
    TB: Clone + 'static,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<(TA, TB), GenerationError> {
        let left = self.left.generate(rng, config)?;
        let right = self.right.generate(rng, config)?;
        Ok((left, right))
    }

    fn shrink(&self, value: &(TA, TB)) -> Box<dyn Iterator<Item = (TA, TB)>> {
        let candidates = strategies::pair_candidates(
            value,
            |a| self.left.shrink(a).collect(),
            |b| self.right.shrink(b).collect(),
        );
        Box::new(candidates.into_iter())
    }
}

/// A generator that combines three generators to produce triples
#[derive(Clone)]
pub struct Zip3<A, B, C, TA, TB, TC> {
    first: A,
    second: B,
    third: C,
    _phantom: PhantomData<fn() -> (TA, TB, TC)>,
}

impl<A, B, C, TA, TB, TC> Generator<(TA, TB, TC)> for Zip3<A, B, C, TA, TB, TC>
where
    A: Generator<TA>,
    B: Generator<TB>,
    C: Generator<TC>,
    TA: Clone + 'static,
    TB: Clone + 'static,
    TC: Clone + 'static,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<(TA, TB, TC), GenerationError> {
        let first = self.first.generate(rng, config)?;
        let second = self.second.generate(rng, config)?;
        let third = self.third.generate(rng, config)?;
        Ok((first, second, third))
    }

    fn shrink(&self, value: &(TA, TB, TC)) -> Box<dyn Iterator<Item = (TA, TB, TC)>> {
        let candidates = strategies::triple_candidates(
            value,
            |a| self.first.shrink(a).collect(),
            |b| self.second.shrink(b).collect(),
            |c| self.third.shrink(c).collect(),
        );
        Box::new(candidates.into_iter())
    }
}

/// Pair two generators
pub fn zip<A, B, TA, TB>(left: A, right: B) -> Zip<A, B, TA, TB>
where
    A: Generator<TA>,
    B: Generator<TB>,
{
    Zip::new(left, right)
}

/// Combine three generators into a triple generator
pub fn zip3<A, B, C, TA, TB, TC>(first: A, second: B, third: C) -> Zip3<A, B, C, TA, TB, TC>
where
    A: Generator<TA>,
    B: Generator<TB>,
    C: Generator<TC>,
{
    Zip3 {
        first,
        second,
        third,
        _phantom: PhantomData,
    }
}

/// Uniform choice between several generators
#[derive(Debug, Clone)]
pub struct OneOf<T> {
    choices: Vec<BoxedGenerator<T>>,
}

impl<T: 'static> Generator<T> for OneOf<T> {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        let index = rng.gen_range(0..self.choices.len());
        self.choices[index].generate(rng, config)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        // The producing branch is unknown, so every branch proposes candidates
        let candidates: Vec<T> = self
            .choices
            .iter()
            .flat_map(|choice| choice.shrink(value))
            .collect();
        Box::new(candidates.into_iter())
    }
}

/// Create a generator choosing uniformly between `choices`
///
/// # Panics
///
/// Panics if `choices` is empty.
pub fn one_of<T>(choices: Vec<BoxedGenerator<T>>) -> OneOf<T> {
    if choices.is_empty() {
        panic!("one_of requires at least one generator");
    }
    OneOf { choices }
}

/// Weighted choice between several generators
#[derive(Debug, Clone)]
pub struct Frequency<T> {
    choices: Vec<(u32, BoxedGenerator<T>)>,
    total_weight: u64,
}

impl<T: 'static> Generator<T> for Frequency<T> {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        let mut roll = rng.gen_range(0..self.total_weight);
        for (weight, choice) in &self.choices {
            let weight = u64::from(*weight);
            if roll < weight {
                return choice.generate(rng, config);
            }
            roll -= weight;
        }
        unreachable!("roll is always below the total weight")
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let candidates: Vec<T> = self
            .choices
            .iter()
            .filter(|(weight, _)| *weight > 0)
            .flat_map(|(_, choice)| choice.shrink(value))
            .collect();
        Box::new(candidates.into_iter())
    }
}

/// Create a generator choosing between `choices` proportionally to their weights.
///
/// Choices with weight 0 are never selected.
///
/// # Panics
///
/// Panics if `choices` is empty or every weight is 0.
pub fn frequency<T>(choices: Vec<(u32, BoxedGenerator<T>)>) -> Frequency<T> {
    let total_weight: u64 = choices.iter().map(|(weight, _)| u64::from(*weight)).sum();
    if total_weight == 0 {
        panic!("frequency requires at least one generator with a positive weight");
    }
    Frequency {
        choices,
        total_weight,
    }
}

/// A generator built from the current size hint.
///
/// Shrinking rebuilds the inner generator from the most recent size hint seen
/// by `generate`, or the default hint before the first draw.
pub struct SizedGenerator<F> {
    build: F,
    last_size: AtomicUsize,
}

impl<F, G, T> Generator<T> for SizedGenerator<F>
where
    F: Fn(usize) -> G,
    G: Generator<T>,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        self.last_size.store(config.size_hint, Ordering::Relaxed);
        (self.build)(config.size_hint).generate(rng, config)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>>
    where
        T: 'static,
    {
        (self.build)(self.last_size.load(Ordering::Relaxed)).shrink(value)
    }
}

/// Build a generator from the size hint in effect at draw time
pub fn sized<F, G, T>(build: F) -> SizedGenerator<F>
where
    F: Fn(usize) -> G,
    G: Generator<T>,
{
    SizedGenerator {
        build,
        last_size: AtomicUsize::new(GeneratorConfig::default().size_hint),
    }
}

/// A generator that sees a fixed size hint
#[derive(Debug, Clone)]
pub struct Resize<G> {
    generator: G,
    size: usize,
}

impl<G, T> Generator<T> for Resize<G>
where
    G: Generator<T>,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        let resized = config.clone().with_size_hint(self.size);
        self.generator.generate(rng, &resized)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>>
    where
        T: 'static,
    {
        self.generator.shrink(value)
    }
}

/// Override the size hint seen by `generator`
pub fn resize<G>(generator: G, size: usize) -> Resize<G> {
    Resize { generator, size }
}

/// A depth-bounded recursive generator.
///
/// Level 0 is the base generator; level `d` is `build` applied to level
/// `d - 1`. Levels are built once at construction, so no generator ever
/// refers to itself.
#[derive(Debug, Clone)]
pub struct Recursive<T> {
    levels: Vec<BoxedGenerator<T>>,
}

impl<T> Recursive<T> {
    /// Maximum nesting this generator can produce
    pub fn max_depth(&self) -> usize {
        self.levels.len() - 1
    }

    fn level(&self, config: &GeneratorConfig) -> &BoxedGenerator<T> {
        let depth = self.max_depth().min(config.max_depth);
        &self.levels[depth]
    }
}

impl<T: 'static> Generator<T> for Recursive<T> {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        self.level(config).generate(rng, config)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        // The deepest level accepts every value any shallower level produces
        self.levels[self.max_depth()].shrink(value)
    }
}

/// Build a recursive generator nesting at most `max_depth` levels deep.
///
/// The effective depth is further capped by [`GeneratorConfig::max_depth`].
pub fn recursive<G, T, F>(base: G, max_depth: usize, build: F) -> Recursive<T>
where
    G: Generator<T> + Send + Sync + 'static,
    F: Fn(BoxedGenerator<T>) -> BoxedGenerator<T>,
{
    let mut levels = Vec::with_capacity(max_depth + 1);
    levels.push(base.boxed());
    for depth in 1..=max_depth {
        let next = build(levels[depth - 1].clone());
        levels.push(next);
    }
    Recursive { levels }
}
