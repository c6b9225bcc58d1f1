use std::{any::type_name, fmt::Debug, sync::OnceLock};

use parking_lot::Mutex;

use crate::errors::ScopeError;

/// Boxed producer, used when the producer type does not need to be named
pub type BoxedProducer<T> = Box<dyn FnOnce() -> Option<T> + Send>;

/// Lazily initialized value of a scoped binding
///
/// The producer is called at most once, by whichever caller of [`ScopedCell::get`]
/// gets there first. Concurrent callers block until that call finishes, later
/// callers read the stored result without locking.
///
/// A producer returning `None` is an error, and that error is kept: every call to
/// `get` fails from then on, the producer is never run again.
///
/// A producer that never returns blocks every waiting caller forever.
pub struct ScopedCell<T, F = BoxedProducer<T>> {
    value: OnceLock<Result<T, ScopeError>>,
    producer: Mutex<Option<F>>,
}
impl<T, F> ScopedCell<T, F>
where
    F: FnOnce() -> Option<T>,
{
    pub fn new(producer: F) -> Self {
        ScopedCell {
            value: OnceLock::new(),
            producer: Mutex::new(Some(producer)),
        }
    }

    /// Returns the value, running the producer if nobody has yet
    pub fn get(&self) -> Result<&T, ScopeError> {
        if let Some(result) = self.value.get() {
            return result.as_ref().map_err(Clone::clone);
        }

        // Lock producer, so only one caller runs it
        let mut producer = self.producer.lock();

        // Double check - it might have been set while we waited for the lock
        if let Some(result) = self.value.get() {
            return result.as_ref().map_err(Clone::clone);
        }

        // Taken before running, a panicking producer leaves nothing to retry
        let Some(produce) = producer.take() else {
            return Err(ScopeError::ProducerPanicked {
                type_name: type_name::<T>(),
            });
        };

        let result = match produce() {
            Some(value) => {
                tracing::debug!("Initialized scoped {}", type_name::<T>());
                Ok(value)
            }
            None => {
                tracing::error!("Producer for scoped {} returned no value", type_name::<T>());
                Err(ScopeError::InvariantViolation {
                    type_name: type_name::<T>(),
                })
            }
        };

        let stored = self.value.get_or_init(|| result);
        drop(producer);

        stored.as_ref().map_err(Clone::clone)
    }
}
impl<T, F> ScopedCell<T, F> {
    /// Whether the producer has already run to completion
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }
}
impl<T> ScopedCell<T> {
    /// Wraps any producer closure without naming its type
    pub fn boxed(producer: impl FnOnce() -> Option<T> + Send + 'static) -> Self {
        ScopedCell::new(Box::new(producer) as BoxedProducer<T>)
    }

    /// A cell which is already initialized
    pub fn with_value(value: T) -> Self {
        ScopedCell {
            value: OnceLock::from(Ok(value)),
            producer: Mutex::new(None),
        }
    }
}
impl<T: Debug, F> Debug for ScopedCell<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value.get() {
            Some(Ok(value)) => f.debug_tuple("ScopedCell").field(value).finish(),
            Some(Err(error)) => f.debug_tuple("ScopedCell").field(error).finish(),
            None => f.debug_tuple("ScopedCell").field(&"<uninitialized>").finish(),
        }
    }
}
