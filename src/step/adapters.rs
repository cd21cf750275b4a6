//! Adapters from step-function shapes to the canonical [`Transform`].
//!
//! The supported shapes form a closed set: no input or an [`Ensure<T>`] of
//! the previous result, synchronous or asynchronous, infallible or (wrapped
//! in [`Fallible`]) returning `Result<R, E>`. Marker types keep the impls
//! coherent; callers never name them.

use std::any::{Any, type_name};
use std::future::Future;
use std::marker::PhantomData;

use super::Transform;
use crate::value::{Ensure, StepValue};

/// A synchronous step function.
pub trait IntoStep<Marker>: Send + 'static {
    /// Normalise into the canonical transform.
    fn into_transform(self) -> Transform;

    /// Type name of the underlying function, used for auto-naming.
    fn function_type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// An asynchronous step function.
pub trait IntoAsyncStep<Marker>: Send + 'static {
    /// Normalise into the canonical transform.
    fn into_transform(self) -> Transform;

    /// Type name of the underlying function, used for auto-naming.
    fn function_type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Marks a step function whose `Err` should fail the step.
///
/// ```
/// use fluent_scenario::{Ensure, MemoryOutput, Scenario, fallible};
///
/// # fn main() -> eyre::Result<()> {
/// let failure = Scenario::new("parsing", MemoryOutput::new())?
///     .given("a number", || String::from("forty-two"))
///     .when(
///         "the number is parsed",
///         fallible(|text: Ensure<String>| text.parse::<i32>()),
///     )
///     .play_blocking();
///
/// assert!(failure.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(F);

/// Wrap a `Result`-returning step function; see [`Fallible`].
#[must_use]
pub const fn fallible<F>(step: F) -> Fallible<F> {
    Fallible(step)
}

/// Marker: `FnOnce() -> R`.
#[derive(Debug)]
pub struct NoInput<R>(PhantomData<fn() -> R>);

/// Marker: `FnOnce(Ensure<T>) -> R`.
#[derive(Debug)]
pub struct WithInput<T, R>(PhantomData<fn(T) -> R>);

/// Marker: `FnOnce() -> Result<R, E>`.
#[derive(Debug)]
pub struct TryNoInput<R, E>(PhantomData<fn() -> Result<R, E>>);

/// Marker: `FnOnce(Ensure<T>) -> Result<R, E>`.
#[derive(Debug)]
pub struct TryWithInput<T, R, E>(PhantomData<fn(T) -> Result<R, E>>);

/// Marker: `FnOnce() -> impl Future<Output = R>`.
#[derive(Debug)]
pub struct AsyncNoInput<R>(PhantomData<fn() -> R>);

/// Marker: `FnOnce(Ensure<T>) -> impl Future<Output = R>`.
#[derive(Debug)]
pub struct AsyncWithInput<T, R>(PhantomData<fn(T) -> R>);

/// Marker: `FnOnce() -> impl Future<Output = Result<R, E>>`.
#[derive(Debug)]
pub struct TryAsyncNoInput<R, E>(PhantomData<fn() -> Result<R, E>>);

/// Marker: `FnOnce(Ensure<T>) -> impl Future<Output = Result<R, E>>`.
#[derive(Debug)]
pub struct TryAsyncWithInput<T, R, E>(PhantomData<fn(T) -> Result<R, E>>);

impl<F, R> IntoStep<NoInput<R>> for F
where
    F: FnOnce() -> R + Send + 'static,
    R: Any + Send,
{
    fn into_transform(self) -> Transform {
        Box::new(move |_| Box::pin(async move { Ok(StepValue::new(self())) }))
    }
}

impl<F, T, R> IntoStep<WithInput<T, R>> for F
where
    F: FnOnce(Ensure<T>) -> R + Send + 'static,
    T: Any + Default + Send,
    R: Any + Send,
{
    fn into_transform(self) -> Transform {
        Box::new(move |input| {
            Box::pin(async move { Ok(StepValue::new(self(Ensure::from_value(input)))) })
        })
    }
}

impl<F, R, E> IntoStep<TryNoInput<R, E>> for Fallible<F>
where
    F: FnOnce() -> Result<R, E> + Send + 'static,
    R: Any + Send,
    E: Into<eyre::Report> + 'static,
{
    fn into_transform(self) -> Transform {
        let Self(step) = self;
        Box::new(move |_| Box::pin(async move { step().map(StepValue::new).map_err(Into::into) }))
    }

    fn function_type_name(&self) -> &'static str {
        type_name::<F>()
    }
}

impl<F, T, R, E> IntoStep<TryWithInput<T, R, E>> for Fallible<F>
where
    F: FnOnce(Ensure<T>) -> Result<R, E> + Send + 'static,
    T: Any + Default + Send,
    R: Any + Send,
    E: Into<eyre::Report> + 'static,
{
    fn into_transform(self) -> Transform {
        let Self(step) = self;
        Box::new(move |input| {
            Box::pin(async move {
                step(Ensure::from_value(input))
                    .map(StepValue::new)
                    .map_err(Into::into)
            })
        })
    }

    fn function_type_name(&self) -> &'static str {
        type_name::<F>()
    }
}

impl<F, Fut, R> IntoAsyncStep<AsyncNoInput<R>> for F
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Any + Send,
{
    fn into_transform(self) -> Transform {
        Box::new(move |_| Box::pin(async move { Ok(StepValue::new(self().await)) }))
    }
}

impl<F, Fut, T, R> IntoAsyncStep<AsyncWithInput<T, R>> for F
where
    F: FnOnce(Ensure<T>) -> Fut + Send + 'static,
    Fut: Future<Output = R> + Send + 'static,
    T: Any + Default + Send,
    R: Any + Send,
{
    fn into_transform(self) -> Transform {
        Box::new(move |input| {
            Box::pin(async move { Ok(StepValue::new(self(Ensure::from_value(input)).await)) })
        })
    }
}

impl<F, Fut, R, E> IntoAsyncStep<TryAsyncNoInput<R, E>> for Fallible<F>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Any + Send,
    E: Into<eyre::Report> + 'static,
{
    fn into_transform(self) -> Transform {
        let Self(step) = self;
        Box::new(move |_| {
            Box::pin(async move { step().await.map(StepValue::new).map_err(Into::into) })
        })
    }

    fn function_type_name(&self) -> &'static str {
        type_name::<F>()
    }
}

impl<F, Fut, T, R, E> IntoAsyncStep<TryAsyncWithInput<T, R, E>> for Fallible<F>
where
    F: FnOnce(Ensure<T>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    T: Any + Default + Send,
    R: Any + Send,
    E: Into<eyre::Report> + 'static,
{
    fn into_transform(self) -> Transform {
        let Self(step) = self;
        Box::new(move |input| {
            Box::pin(async move {
                step(Ensure::from_value(input))
                    .await
                    .map(StepValue::new)
                    .map_err(Into::into)
            })
        })
    }

    fn function_type_name(&self) -> &'static str {
        type_name::<F>()
    }
}
