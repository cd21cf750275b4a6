//! Erased step results and the typed wrapper used to recover them.
//!
//! The pipeline threads one [`StepValue`] from step to step without knowing
//! its type. A consuming step asks for an [`Ensure<T>`], which performs the
//! checked downcast and falls back to `T::default()` when the previous step
//! produced nothing or produced something else.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::ops::Deref;

/// A type-erased, possibly absent step result.
pub struct StepValue {
    slot: Option<Box<dyn Any + Send>>,
    type_name: &'static str,
}

impl StepValue {
    /// Name reported for an absent value.
    pub const EMPTY_TYPE_NAME: &'static str = "nothing";

    /// The absent value: the input of the first step and the output of any
    /// step that returns `()`.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            slot: None,
            type_name: Self::EMPTY_TYPE_NAME,
        }
    }

    /// Erase `value`. A unit value is stored as [`StepValue::empty`].
    #[must_use]
    pub fn new<T: Any + Send>(value: T) -> Self {
        if TypeId::of::<T>() == TypeId::of::<()>() {
            return Self::empty();
        }
        Self {
            slot: Some(Box::new(value)),
            type_name: type_name::<T>(),
        }
    }

    /// Erase `value` exactly as given, keeping a unit value as `()`.
    ///
    /// Named values use this so that storing `()` can be read back.
    #[must_use]
    pub fn stored<T: Any + Send>(value: T) -> Self {
        Self {
            slot: Some(Box::new(value)),
            type_name: type_name::<T>(),
        }
    }

    /// Returns `true` when no value is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Returns `true` when the held value is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.slot.as_ref().is_some_and(|value| value.is::<T>())
    }

    /// The type name of the held value, or `"nothing"`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the held value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.slot.as_ref().and_then(|value| value.downcast_ref::<T>())
    }

    /// Take the held value as a `T`, handing `self` back unchanged on a miss.
    ///
    /// # Errors
    ///
    /// Returns the original value when it is absent or not a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self { slot, type_name } = self;
        match slot {
            Some(boxed) => boxed
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|original| Self {
                    slot: Some(original),
                    type_name,
                }),
            None => Err(Self::empty()),
        }
    }
}

impl Default for StepValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for StepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepValue")
            .field("type_name", &self.type_name)
            .field("present", &self.slot.is_some())
            .finish()
    }
}

/// A step result recovered as a `T`.
///
/// Construction never fails: an absent or mismatched value yields
/// `T::default()`. [`Ensure::was_present`] tells the two cases apart for
/// callers that care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ensure<T> {
    value: T,
    present: bool,
}

impl<T: Any + Default> Ensure<T> {
    /// Interpret an erased value as a `T`.
    #[must_use]
    pub fn from_value(value: StepValue) -> Self {
        match value.downcast::<T>() {
            Ok(inner) => Self {
                value: inner,
                present: true,
            },
            Err(other) => {
                if !other.is_empty() {
                    tracing::debug!(
                        expected = type_name::<T>(),
                        found = other.type_name(),
                        "step result type mismatch, using default"
                    );
                }
                Self {
                    value: T::default(),
                    present: false,
                }
            }
        }
    }
}

impl<T> Ensure<T> {
    /// Wrap a value that is already typed.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            present: true,
        }
    }

    /// Borrow the wrapped value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Unwrap into the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Whether the value came from the previous step rather than the default.
    #[must_use]
    pub const fn was_present(&self) -> bool {
        self.present
    }
}

impl<T> Deref for Ensure<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
