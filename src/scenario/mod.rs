//! The scenario pipeline.
//!
//! A [`Scenario`] owns an ordered list of [`StepRecord`]s, a
//! [`ScenarioContext`], and the sink its transcript goes to. Appending a step
//! (`given`, `when`, `then`, `and` and their variants) labels it and pushes
//! it; nothing runs until [`Scenario::play`]. Playing drains the list, runs
//! each step once in order with the previous step's result as input, writes
//! one transcript line per step, and stops at the first failure.
//!
//! ```
//! use fluent_scenario::{Ensure, MemoryOutput, Scenario};
//!
//! # fn main() -> eyre::Result<()> {
//! # let runtime = tokio::runtime::Runtime::new()?;
//! # runtime.block_on(async {
//! let output = MemoryOutput::new();
//! let total = Scenario::new("adding numbers", output.clone())?
//!     .given("a starting value", || 40_i32)
//!     .when("two is added", |n: Ensure<i32>| *n + 2)
//!     .play_as::<i32>()
//!     .await?;
//! assert_eq!(*total, 42);
//! # Ok::<(), eyre::Report>(())
//! # })
//! # }
//! ```

mod runner;

use std::any::{Any, type_name};
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::Instrument;

pub use runner::StepRunner;

use crate::config::NarratorConfig;
use crate::context::ScenarioContext;
use crate::error::{ConstructionError, ContextError, Result};
use crate::narrative::{self, label_for};
use crate::output::{Markers, ScenarioOutput};
use crate::step::{Command, IntoAsyncStep, IntoStep, StepRecord};
use crate::value::{Ensure, StepValue};

/// An ordered, single-use sequence of narrative steps.
pub struct Scenario {
    description: String,
    steps: Vec<StepRecord>,
    context: ScenarioContext,
    output: Box<dyn ScenarioOutput>,
    markers: Markers,
}

impl Scenario {
    /// Start a scenario whose first step receives no input.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyDescription`] when `description` is
    /// empty or whitespace.
    pub fn new(
        description: impl Into<String>,
        output: impl ScenarioOutput + 'static,
    ) -> Result<Self> {
        Self::build(description.into(), StepValue::empty(), Box::new(output))
    }

    /// Start a scenario whose first step receives `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyDescription`] when `description` is
    /// empty or whitespace.
    pub fn with_input<T: Any + Send>(
        description: impl Into<String>,
        input: T,
        output: impl ScenarioOutput + 'static,
    ) -> Result<Self> {
        Self::build(description.into(), StepValue::new(input), Box::new(output))
    }

    /// Start a scenario using the sink and markers chosen by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyDescription`] when `description` is
    /// empty or whitespace.
    pub fn from_config(description: impl Into<String>, config: &NarratorConfig) -> Result<Self> {
        Self::build(description.into(), StepValue::empty(), config.output())
            .map(|scenario| scenario.with_markers(config.markers()))
    }

    fn build(
        description: String,
        input: StepValue,
        output: Box<dyn ScenarioOutput>,
    ) -> Result<Self> {
        if description.trim().is_empty() {
            return Err(ConstructionError::EmptyDescription.into());
        }
        let header = StepRecord::scenario_header(&description, input);
        Ok(Self {
            description,
            steps: vec![header],
            context: ScenarioContext::new(),
            output,
            markers: Markers::default(),
        })
    }

    /// Replace the success and failure markers used in transcript lines.
    #[must_use]
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// The description given at construction.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// A handle to this scenario's named values.
    #[must_use]
    pub fn context(&self) -> ScenarioContext {
        self.context.clone()
    }

    /// Store a named value; see [`ScenarioContext::set`].
    pub fn set_context_data<T: Any + Send>(&self, key: impl Into<String>, value: T) {
        self.context.set(key, value);
    }

    /// Read a named value; see [`ScenarioContext::get`].
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] when the key is absent or holds another type.
    pub fn get_context_data<T: Any + Clone>(
        &self,
        key: &str,
    ) -> std::result::Result<T, ContextError> {
        self.context.get(key)
    }

    /// Number of steps waiting to run, including the scenario header.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` once the scenario has been played.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The rendered descriptions of the pending steps, in execution order.
    #[must_use]
    pub fn step_descriptions(&self) -> Vec<&str> {
        self.steps.iter().map(StepRecord::description).collect()
    }

    /// Append a synchronous step under an explicit command.
    #[must_use]
    pub fn step<M>(
        mut self,
        command: Command,
        description: impl Into<String>,
        step: impl IntoStep<M>,
    ) -> Self {
        self.push(StepRecord::from_step(command, description, step));
        self
    }

    /// Append an asynchronous step under an explicit command.
    #[must_use]
    pub fn step_async<M>(
        mut self,
        command: Command,
        description: impl Into<String>,
        step: impl IntoAsyncStep<M>,
    ) -> Self {
        self.push(StepRecord::from_async_step(command, description, step));
        self
    }

    /// Append a `given` step.
    #[must_use]
    pub fn given<M>(self, description: impl Into<String>, step: impl IntoStep<M>) -> Self {
        self.step(Command::Given, description, step)
    }

    /// Append an asynchronous `given` step.
    #[must_use]
    pub fn given_async<M>(
        self,
        description: impl Into<String>,
        step: impl IntoAsyncStep<M>,
    ) -> Self {
        self.step_async(Command::Given, description, step)
    }

    /// Append a `given` step described by its function name.
    #[must_use]
    pub fn given_fn<M>(self, step: impl IntoStep<M>) -> Self {
        let description = narrative::function_name(step.function_type_name());
        self.step(Command::Given, description, step)
    }

    /// Append `given` steps through a [`StepRunner`].
    #[must_use]
    pub fn given_steps(self, build: impl FnOnce(&mut StepRunner<'_>)) -> Self {
        self.with_runner(Command::Given, build)
    }

    /// Append a `when` step.
    #[must_use]
    pub fn when<M>(self, description: impl Into<String>, step: impl IntoStep<M>) -> Self {
        self.step(Command::When, description, step)
    }

    /// Append an asynchronous `when` step.
    #[must_use]
    pub fn when_async<M>(
        self,
        description: impl Into<String>,
        step: impl IntoAsyncStep<M>,
    ) -> Self {
        self.step_async(Command::When, description, step)
    }

    /// Append a `when` step described by its function name.
    #[must_use]
    pub fn when_fn<M>(self, step: impl IntoStep<M>) -> Self {
        let description = narrative::function_name(step.function_type_name());
        self.step(Command::When, description, step)
    }

    /// Append `when` steps through a [`StepRunner`].
    #[must_use]
    pub fn when_steps(self, build: impl FnOnce(&mut StepRunner<'_>)) -> Self {
        self.with_runner(Command::When, build)
    }

    /// Append a `then` step.
    #[must_use]
    pub fn then<M>(self, description: impl Into<String>, step: impl IntoStep<M>) -> Self {
        self.step(Command::Then, description, step)
    }

    /// Append an asynchronous `then` step.
    #[must_use]
    pub fn then_async<M>(
        self,
        description: impl Into<String>,
        step: impl IntoAsyncStep<M>,
    ) -> Self {
        self.step_async(Command::Then, description, step)
    }

    /// Append a `then` step described by its function name.
    #[must_use]
    pub fn then_fn<M>(self, step: impl IntoStep<M>) -> Self {
        let description = narrative::function_name(step.function_type_name());
        self.step(Command::Then, description, step)
    }

    /// Append `then` steps through a [`StepRunner`].
    #[must_use]
    pub fn then_steps(self, build: impl FnOnce(&mut StepRunner<'_>)) -> Self {
        self.with_runner(Command::Then, build)
    }

    /// Append a step continuing the previous step's command.
    #[must_use]
    pub fn and<M>(self, description: impl Into<String>, step: impl IntoStep<M>) -> Self {
        let command = self.continued_command();
        self.step(command, description, step)
    }

    /// Append an asynchronous step continuing the previous step's command.
    #[must_use]
    pub fn and_async<M>(
        self,
        description: impl Into<String>,
        step: impl IntoAsyncStep<M>,
    ) -> Self {
        let command = self.continued_command();
        self.step_async(command, description, step)
    }

    /// Append a continuation step described by its function name.
    #[must_use]
    pub fn and_fn<M>(self, step: impl IntoStep<M>) -> Self {
        let command = self.continued_command();
        let description = narrative::function_name(step.function_type_name());
        self.step(command, description, step)
    }

    /// Append continuation steps through a [`StepRunner`].
    #[must_use]
    pub fn and_steps(self, build: impl FnOnce(&mut StepRunner<'_>)) -> Self {
        let command = self.continued_command();
        self.with_runner(command, build)
    }

    /// Run every pending step and return the final result as a `T`.
    ///
    /// The step list is drained first, so a second call runs nothing and
    /// yields `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first fallible step that fails, unchanged.
    /// Later steps do not run.
    ///
    /// # Panics
    ///
    /// A panicking step (for example a failed `assert!`) is reported as
    /// failed and the panic is resumed with its original payload.
    pub async fn play_as<T: Any + Default>(&mut self) -> eyre::Result<Ensure<T>> {
        let steps = std::mem::take(&mut self.steps);
        let span = tracing::info_span!(
            "scenario.play",
            scenario = %self.description,
            steps = steps.len(),
        );
        let result = run_steps(&*self.output, &self.markers, steps)
            .instrument(span)
            .await?;
        tracing::debug!(
            result = result.type_name(),
            requested = type_name::<T>(),
            "scenario finished"
        );
        Ok(Ensure::from_value(result))
    }

    /// Run every pending step, discarding the final result.
    ///
    /// # Errors
    ///
    /// See [`Scenario::play_as`].
    ///
    /// # Panics
    ///
    /// See [`Scenario::play_as`].
    pub async fn play(&mut self) -> eyre::Result<()> {
        self.play_as::<()>().await.map(Ensure::into_inner)
    }

    /// Drive [`Scenario::play_as`] on a fresh current-thread runtime.
    ///
    /// For synchronous tests. Do not call from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be built, otherwise see
    /// [`Scenario::play_as`].
    ///
    /// # Panics
    ///
    /// See [`Scenario::play_as`].
    pub fn play_blocking_as<T: Any + Default>(&mut self) -> eyre::Result<Ensure<T>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.play_as::<T>())
    }

    /// Drive [`Scenario::play`] on a fresh current-thread runtime.
    ///
    /// # Errors
    ///
    /// See [`Scenario::play_blocking_as`].
    ///
    /// # Panics
    ///
    /// See [`Scenario::play_as`].
    pub fn play_blocking(&mut self) -> eyre::Result<()> {
        self.play_blocking_as::<()>().map(Ensure::into_inner)
    }

    /// Label `record` against the last pending step and push it.
    pub(crate) fn push(&mut self, record: StepRecord) {
        let previous = self.steps.last().map(StepRecord::command);
        let label = label_for(record.command(), previous);
        let labelled = record.labelled(label);
        tracing::trace!(step = labelled.description(), "step appended");
        self.steps.push(labelled);
    }

    /// The command an `and` step takes at this point.
    fn continued_command(&self) -> Command {
        self.steps
            .last()
            .map_or(Command::Given, |step| step.command().continued())
    }

    fn with_runner(mut self, command: Command, build: impl FnOnce(&mut StepRunner<'_>)) -> Self {
        let mut runner = StepRunner::new(&mut self, command);
        build(&mut runner);
        self
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("description", &self.description)
            .field("steps", &self.steps)
            .field("context", &self.context)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// Execute `steps` in order, threading each result into the next step.
async fn run_steps(
    output: &dyn ScenarioOutput,
    markers: &Markers,
    steps: Vec<StepRecord>,
) -> eyre::Result<StepValue> {
    let mut current = StepValue::empty();

    for step in steps {
        let (description, transform) = step.into_parts();
        tracing::debug!(step = %description, input = current.type_name(), "step started");

        match AssertUnwindSafe(transform(current)).catch_unwind().await {
            Ok(Ok(next)) => {
                output.write_line(&markers.passed(&description));
                tracing::debug!(step = %description, output = next.type_name(), "step passed");
                current = next;
            }
            Ok(Err(report)) => {
                tracing::warn!(step = %description, error = %report, "step failed");
                output.write_line(&markers.failed(&description));
                return Err(report);
            }
            Err(payload) => {
                tracing::warn!(
                    step = %description,
                    panic = %panic_message(payload.as_ref()),
                    "step panicked"
                );
                output.write_line(&markers.failed(&description));
                std::panic::resume_unwind(payload);
            }
        }
    }

    Ok(current)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&'static str>().copied())
        .unwrap_or("unknown panic")
}

/// Start a [`Scenario`] described by the enclosing function's name.
///
/// `scenario!(output)` and `scenario!(output, input)` mirror
/// [`Scenario::new`] and [`Scenario::with_input`]; the description is the
/// calling function's name turned into a sentence, so a test named
/// `when_the_weather_is_too_cold` narrates as
/// `SCENARIO for when the weather is too cold`.
#[macro_export]
macro_rules! scenario {
    ($output:expr $(,)?) => {
        $crate::Scenario::new(
            $crate::narrative::sentence_from_identifier($crate::function_name!()),
            $output,
        )
    };
    ($output:expr, $input:expr $(,)?) => {
        $crate::Scenario::with_input(
            $crate::narrative::sentence_from_identifier($crate::function_name!()),
            $input,
            $output,
        )
    };
}
