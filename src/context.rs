//! Named-value store shared by the steps of one scenario.
//!
//! The typed result chain passes one value from a step to the next. Steps
//! that would rather share state by name read and write a
//! [`ScenarioContext`] instead. The handle is cheap to clone, so a step body
//! can capture it and use it while the scenario plays.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ContextError;
use crate::value::StepValue;

/// A cloneable handle to a scenario's named values.
#[derive(Clone, Debug, Default)]
pub struct ScenarioContext {
    values: Arc<Mutex<HashMap<String, StepValue>>>,
}

impl ScenarioContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T: Any + Send>(&self, key: impl Into<String>, value: T) {
        let key_owned = key.into();
        tracing::debug!(key = %key_owned, value_type = type_name::<T>(), "context value set");
        self.lock().insert(key_owned, StepValue::stored(value));
    }

    /// Read a copy of the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::KeyNotFound`] when nothing is stored under
    /// `key`, or [`ContextError::TypeMismatch`] when the stored value is not
    /// a `T`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Result<T, ContextError> {
        let values = self.lock();
        let stored = values.get(key).ok_or_else(|| ContextError::KeyNotFound {
            key: key.to_owned(),
        })?;
        stored
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ContextError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
                found: stored.type_name(),
            })
    }

    /// Remove and return the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`ScenarioContext::get`]. A value of the wrong type is left in
    /// place.
    pub fn remove<T: Any>(&self, key: &str) -> Result<T, ContextError> {
        let mut values = self.lock();
        let stored = values.remove(key).ok_or_else(|| ContextError::KeyNotFound {
            key: key.to_owned(),
        })?;
        stored.downcast::<T>().map_err(|original| {
            let found = original.type_name();
            values.insert(key.to_owned(), original);
            ContextError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
                found,
            }
        })
    }

    /// Returns `true` if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A step that panicked while holding the lock cannot leave a map entry
    // half-written, so the poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, StepValue>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
