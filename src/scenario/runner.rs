//! Direct access to a scenario while its steps are being declared.

use std::any::Any;

use super::Scenario;
use crate::context::ScenarioContext;
use crate::error::ContextError;
use crate::narrative;
use crate::step::{Command, IntoAsyncStep, IntoStep, StepRecord};

/// Declares steps under one command and reaches the scenario's context.
///
/// Handed to the closures passed to `given_steps`, `when_steps`,
/// `then_steps` and `and_steps`. Every `execute*` call appends one step; the
/// second and later steps of the same runner render as `and`.
///
/// ```
/// use fluent_scenario::{MemoryOutput, Scenario};
///
/// # fn main() -> eyre::Result<()> {
/// let scenario = Scenario::new("the weather", MemoryOutput::new())?
///     .given_steps(|runner| {
///         let context = runner.context();
///         runner.execute("it is 19C inside", move || context.set("inside", 19_i32));
///         runner.execute("it is -5C outside", || -5_i32);
///     });
///
/// assert_eq!(
///     scenario.step_descriptions(),
///     vec![
///         "SCENARIO for the weather",
///         "GIVEN it is 19C inside",
///         "and it is -5C outside",
///     ]
/// );
/// # Ok(())
/// # }
/// ```
pub struct StepRunner<'a> {
    scenario: &'a mut Scenario,
    command: Command,
}

impl<'a> StepRunner<'a> {
    pub(super) const fn new(scenario: &'a mut Scenario, command: Command) -> Self {
        Self { scenario, command }
    }
}

impl StepRunner<'_> {
    /// The command every step appended through this runner takes.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// Append a synchronous step.
    pub fn execute<M>(
        &mut self,
        description: impl Into<String>,
        step: impl IntoStep<M>,
    ) -> &mut Self {
        self.scenario
            .push(StepRecord::from_step(self.command, description, step));
        self
    }

    /// Append an asynchronous step.
    pub fn execute_async<M>(
        &mut self,
        description: impl Into<String>,
        step: impl IntoAsyncStep<M>,
    ) -> &mut Self {
        self.scenario
            .push(StepRecord::from_async_step(self.command, description, step));
        self
    }

    /// Append a synchronous step described by its function name.
    ///
    /// A closure takes the name of the function it is written in.
    pub fn execute_fn<M>(&mut self, step: impl IntoStep<M>) -> &mut Self {
        let description = narrative::function_name(step.function_type_name());
        self.execute(description, step)
    }

    /// Append an asynchronous step described by its function name.
    pub fn execute_async_fn<M>(&mut self, step: impl IntoAsyncStep<M>) -> &mut Self {
        let description = narrative::function_name(step.function_type_name());
        self.execute_async(description, step)
    }

    /// A handle to the scenario's named values, for capture by step bodies.
    #[must_use]
    pub fn context(&self) -> ScenarioContext {
        self.scenario.context()
    }

    /// Store a named value now, while steps are being declared.
    pub fn set_context_data<T: Any + Send>(&self, key: impl Into<String>, value: T) {
        self.scenario.set_context_data(key, value);
    }

    /// Read a named value.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] when the key is absent or holds another type.
    pub fn get_context_data<T: Any + Clone>(&self, key: &str) -> Result<T, ContextError> {
        self.scenario.get_context_data(key)
    }
}
