//! The uniform step representation.
//!
//! Every step-function shape the scenario surface accepts is adapted (see
//! [`adapters`]) into one [`Transform`]: an owned async function from the
//! previous step's [`StepValue`] to the next. A [`StepRecord`] pairs that
//! transform with its [`Command`] and display text and stays inert until the
//! pipeline plays it.

mod adapters;

use std::fmt;

use futures_util::future::BoxFuture;

pub use adapters::{
    AsyncNoInput, AsyncWithInput, Fallible, IntoAsyncStep, IntoStep, NoInput, TryAsyncNoInput,
    TryAsyncWithInput, TryNoInput, TryWithInput, WithInput, fallible,
};

use crate::narrative::Label;
use crate::value::StepValue;

/// Boxed future returned by a [`Transform`].
pub type StepFuture = BoxFuture<'static, eyre::Result<StepValue>>;

/// The canonical step body: previous result in, next result out.
pub type Transform = Box<dyn FnOnce(StepValue) -> StepFuture + Send>;

/// The narrative category of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// The synthetic leading step describing the whole scenario.
    Scenario,
    /// Establishes preconditions.
    Given,
    /// Performs the action under test.
    When,
    /// Checks the outcome.
    Then,
}

impl Command {
    /// The keyword as it appears in rendered labels.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Scenario => "SCENARIO",
            Self::Given => "GIVEN",
            Self::When => "WHEN",
            Self::Then => "THEN",
        }
    }

    /// The command an `and` step takes when it follows `self`.
    ///
    /// An `and` straight after the scenario header opens the `given` block.
    #[must_use]
    pub const fn continued(self) -> Self {
        match self {
            Self::Scenario => Self::Given,
            other => other,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One executable step: command tag, display text, and transform.
pub struct StepRecord {
    command: Command,
    description: String,
    transform: Transform,
}

impl StepRecord {
    /// Build a record from an already-normalised transform.
    #[must_use]
    pub fn new(command: Command, description: impl Into<String>, transform: Transform) -> Self {
        Self {
            command,
            description: description.into(),
            transform,
        }
    }

    /// Adapt a synchronous step function.
    #[must_use]
    pub fn from_step<M>(
        command: Command,
        description: impl Into<String>,
        step: impl IntoStep<M>,
    ) -> Self {
        Self::new(command, description, step.into_transform())
    }

    /// Adapt an asynchronous step function.
    #[must_use]
    pub fn from_async_step<M>(
        command: Command,
        description: impl Into<String>,
        step: impl IntoAsyncStep<M>,
    ) -> Self {
        Self::new(command, description, step.into_transform())
    }

    /// The synthetic header step; it hands `input` to the first real step.
    #[must_use]
    pub fn scenario_header(description: &str, input: StepValue) -> Self {
        Self::new(
            Command::Scenario,
            format!("SCENARIO for {description}"),
            Box::new(move |_| Box::pin(async move { Ok(input) })),
        )
    }

    /// The step's command tag.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// The step's display text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Prefix the description with its narrative label.
    ///
    /// Consumes the record so the text can only be rendered once.
    #[must_use]
    pub(crate) fn labelled(self, label: Label) -> Self {
        let Self {
            command,
            description,
            transform,
        } = self;
        Self {
            command,
            description: format!("{label} {description}"),
            transform,
        }
    }

    /// Start the step with the previous result.
    #[must_use = "the step does not run until the future is awaited"]
    pub fn run(self, input: StepValue) -> StepFuture {
        (self.transform)(input)
    }

    /// Split into the display text and the transform.
    #[must_use]
    pub(crate) fn into_parts(self) -> (String, Transform) {
        (self.description, self.transform)
    }
}

impl fmt::Debug for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRecord")
            .field("command", &self.command)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
