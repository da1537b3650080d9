//! Predicates and the immutable property binding.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::PropertyError;
use crate::generator::{BoxedGenerator, Generator};

/// An invariant checked against generated values
pub trait Predicate<T>: Send + Sync {
    /// Check the invariant for one input.
    ///
    /// `Err(PropertyError::PredicateFalse { .. })` marks the input as a
    /// counterexample.
    fn test(&self, input: &T) -> Result<(), PropertyError>;
}

impl<T, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn test(&self, input: &T) -> Result<(), PropertyError> {
        if self(input) {
            Ok(())
        } else {
            Err(PropertyError::predicate_false())
        }
    }
}

/// Adapter for predicates that explain their failures
pub struct Fallible<F, E> {
    check: F,
    _phantom: PhantomData<fn() -> E>,
}

impl<T, F, E> Predicate<T> for Fallible<F, E>
where
    F: Fn(&T) -> Result<(), E> + Send + Sync,
    E: fmt::Display,
{
    fn test(&self, input: &T) -> Result<(), PropertyError> {
        (self.check)(input).map_err(|error| PropertyError::predicate_exception(error.to_string()))
    }
}

/// Wrap a predicate returning `Result`.
///
/// An `Err` is a raised error: the trial fails as
/// [`PropertyError::PredicateException`] with the error's message as cause.
pub fn fallible<T, F, E>(check: F) -> Fallible<F, E>
where
    F: Fn(&T) -> Result<(), E> + Send + Sync,
    E: fmt::Display,
{
    Fallible {
        check,
        _phantom: PhantomData,
    }
}

/// Run `check`, turning a panic into [`PropertyError::PredicateException`]
pub(crate) fn guarded<F>(check: F) -> Result<(), PropertyError>
where
    F: FnOnce() -> Result<(), PropertyError>,
{
    match panic::catch_unwind(AssertUnwindSafe(check)) {
        Ok(result) => result,
        Err(payload) => Err(PropertyError::predicate_exception(panic_message(
            payload.as_ref(),
        ))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

/// A named generator and predicate pair.
///
/// Properties are immutable and cheap to clone; the generator and predicate
/// are shared.
pub struct Property<T> {
    name: String,
    generator: BoxedGenerator<T>,
    predicate: Arc<dyn Predicate<T>>,
}

impl<T> Property<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generator(&self) -> &BoxedGenerator<T> {
        &self.generator
    }

    /// Evaluate the predicate on `input`, catching panics
    pub fn evaluate(&self, input: &T) -> Result<(), PropertyError> {
        guarded(|| self.predicate.test(input))
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            generator: self.generator.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

/// Bind a name, a generator and a boolean predicate
pub fn property<T, G, F>(name: impl Into<String>, generator: G, predicate: F) -> Property<T>
where
    T: 'static,
    G: Generator<T> + Send + Sync + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    property_with(name, generator, predicate)
}

/// Bind a name, a generator and any [`Predicate`]
pub fn property_with<T, G, P>(name: impl Into<String>, generator: G, predicate: P) -> Property<T>
where
    T: 'static,
    G: Generator<T> + Send + Sync + 'static,
    P: Predicate<T> + 'static,
{
    Property {
        name: name.into(),
        generator: generator.boxed(),
        predicate: Arc::new(predicate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::generator::constant;

    #[test]
    fn test_bool_predicate() {
        let prop = property("small", constant(3), |x: &i32| *x < 5);
        assert_eq!(prop.name(), "small");
        assert_eq!(prop.evaluate(&3), Ok(()));
        assert_eq!(prop.evaluate(&7), Err(PropertyError::predicate_false()));
    }

    #[test]
    fn test_fallible_predicate() {
        let prop = property_with(
            "even",
            constant(2),
            fallible(|x: &i32| {
                if x % 2 == 0 {
                    Ok(())
                } else {
                    Err(format!("{x} is odd"))
                }
            }),
        );
        assert_eq!(prop.evaluate(&4), Ok(()));

        let error = prop.evaluate(&3).unwrap_err();
        assert!(!error.is_predicate_false());
        assert_eq!(
            error.failure_kind(),
            FailureKind::PredicateException {
                cause: "3 is odd".to_string()
            }
        );
    }

    #[test]
    fn test_panic_is_exception() {
        let prop = property("divides", constant(0), |x: &i32| 10 / *x > 1);
        let error = prop.evaluate(&0).unwrap_err();
        assert!(!error.is_predicate_false());
        assert!(error.failure_kind().cause().unwrap().contains("divide by zero"));

        let prop = property("explicit", constant(0), |_: &i32| -> bool {
            panic!("custom failure {}", 7)
        });
        let error = prop.evaluate(&0).unwrap_err();
        assert_eq!(error, PropertyError::predicate_exception("custom failure 7"));
    }

    #[test]
    fn test_property_clone_shares_parts() {
        let prop = property("clone", constant(1), |x: &i32| *x == 1);
        let copy = prop.clone();
        assert_eq!(copy.name(), "clone");
        assert_eq!(copy.evaluate(&1), Ok(()));
        assert!(format!("{prop:?}").contains("clone"));
    }
}
