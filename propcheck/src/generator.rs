//! Core generator infrastructure.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rand::Rng;

use crate::combinators::{DEFAULT_MAX_RETRIES, Filter, HasLen, Map, TypeShrink, Zip};
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::shrink::Shrinkable;

/// Core generator trait for creating random test data.
///
/// A generator describes a domain; it does not own randomness. Every draw
/// receives the caller's RNG, so one generator can be sampled by independent
/// streams (see [`ValueSource`](crate::rng::ValueSource)).
pub trait Generator<T> {
    /// Generate a random value of type T using the provided RNG and configuration
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError>;

    /// Create an iterator of simpler values than `value`, in trial order
    fn shrink(&self, _value: &T) -> Box<dyn Iterator<Item = T>>
    where
        T: 'static,
    {
        Box::new(std::iter::empty())
    }

    /// Transform every generated value with `f`
    fn map<U, F>(self, f: F) -> Map<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> U,
    {
        Map::new(self, f)
    }

    /// Redraw until `predicate` accepts, giving up after `max_retries` rejected draws
    fn filter<F>(self, predicate: F, max_retries: usize) -> Filter<Self, F, T>
    where
        Self: Sized,
        F: Fn(&T) -> bool,
    {
        Filter::new(self, predicate, max_retries)
    }

    /// Reject empty collections
    fn non_empty(self) -> Filter<Self, fn(&T) -> bool, T>
    where
        Self: Sized,
        T: HasLen,
    {
        Filter::new(self, <T as HasLen>::is_non_empty, DEFAULT_MAX_RETRIES)
    }

    /// Pair this generator with another, advancing both independently
    fn zip<U, G>(self, other: G) -> Zip<Self, G, T, U>
    where
        Self: Sized,
        G: Generator<U>,
    {
        Zip::new(self, other)
    }

    /// Shrink with the value type's [`Shrinkable`] candidates instead of this
    /// generator's own
    fn shrinkable(self) -> TypeShrink<Self, T>
    where
        Self: Sized,
        T: Shrinkable,
    {
        TypeShrink::new(self)
    }

    /// Erase the concrete generator type
    fn boxed(self) -> BoxedGenerator<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        BoxedGenerator::new(self)
    }
}

/// A shareable, type-erased generator
pub struct BoxedGenerator<T> {
    generator: Arc<dyn Generator<T> + Send + Sync>,
}

impl<T> BoxedGenerator<T> {
    /// Create a new boxed generator
    pub fn new<G: Generator<T> + Send + Sync + 'static>(generator: G) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

impl<T> Clone for BoxedGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<T> fmt::Debug for BoxedGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedGenerator")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Generator<T> for BoxedGenerator<T> {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        self.generator.generate(rng, config)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>>
    where
        T: 'static,
    {
        self.generator.shrink(value)
    }

    fn boxed(self) -> BoxedGenerator<T> {
        self
    }
}

/// A generator that always produces the same value
#[derive(Debug, Clone)]
pub struct ConstantGenerator<T> {
    value: T,
}

impl<T: Clone> ConstantGenerator<T> {
    /// Create a new constant generator
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + 'static> Generator<T> for ConstantGenerator<T> {
    fn generate(
        &self,
        _rng: &mut dyn rand::RngCore,
        _config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        Ok(self.value.clone())
    }
}

/// A generator that picks uniformly from a fixed set of values.
///
/// Values shrink toward the front of the set.
#[derive(Debug, Clone)]
pub struct ElementsGenerator<T> {
    values: Vec<T>,
}

impl<T: Clone> ElementsGenerator<T> {
    /// Create a new element-choice generator
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: Vec<T>) -> Self {
        if values.is_empty() {
            panic!("ElementsGenerator cannot be created with empty values");
        }
        Self { values }
    }
}

impl<T: Clone + PartialEq + 'static> Generator<T> for ElementsGenerator<T> {
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        _config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        let index = rng.gen_range(0..self.values.len());
        Ok(self.values[index].clone())
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let position = self.values.iter().position(|candidate| candidate == value);
        match position {
            Some(index) => Box::new(self.values[..index].to_vec().into_iter()),
            None => Box::new(std::iter::empty()),
        }
    }
}

/// Create a generator that always produces the same value
pub fn constant<T: Clone>(value: T) -> ConstantGenerator<T> {
    ConstantGenerator::new(value)
}

/// Create a generator that picks uniformly from `values`
pub fn elements<T: Clone>(values: Vec<T>) -> ElementsGenerator<T> {
    ElementsGenerator::new(values)
}

/// Adapter for writing generators as plain closures
pub struct FnGenerator<T, F> {
    generate_fn: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> Generator<T> for FnGenerator<T, F>
where
    F: Fn(&mut dyn rand::RngCore, &GeneratorConfig) -> Result<T, GenerationError>,
{
    fn generate(
        &self,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<T, GenerationError> {
        (self.generate_fn)(rng, config)
    }
}

/// Build a generator from a closure; the result never shrinks
pub fn from_fn<T, F>(generate_fn: F) -> FnGenerator<T, F>
where
    F: Fn(&mut dyn rand::RngCore, &GeneratorConfig) -> Result<T, GenerationError>,
{
    FnGenerator {
        generate_fn,
        _phantom: PhantomData,
    }
}
