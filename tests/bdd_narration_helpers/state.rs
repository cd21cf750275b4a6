//! Scenario state for narration BDD tests.

use fluent_scenario::MemoryOutput;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// Convenience alias for step outcomes.
pub type StepResult<T> = Result<T, String>;

/// How a planned step behaves when it runs.
#[derive(Clone, Copy, Debug)]
pub enum Behaviour {
    /// The step completes.
    Pass,
    /// The step returns an error.
    Fail,
    /// The step panics.
    Panic,
}

/// A step declared by the feature, appended when the scenario is built.
#[derive(Clone, Debug)]
pub struct PlannedStep {
    /// `given`, `when`, `then` or `and`.
    pub keyword: String,
    /// The step description.
    pub name: String,
    /// What the step does when played.
    pub behaviour: Behaviour,
}

/// Outcome of building and playing the scenario.
#[derive(Clone, Debug)]
pub enum PlayOutcome {
    /// Every step completed.
    Passed,
    /// A step returned an error.
    Failed {
        /// The `Display` representation of the error.
        message: String,
    },
    /// A step panicked and the panic reached the caller.
    Panicked {
        /// The panic payload text.
        message: String,
    },
    /// The scenario could not be constructed.
    Rejected {
        /// The `Display` representation of the construction error.
        message: String,
    },
}

/// State shared across narration scenarios.
#[derive(Default, ScenarioState)]
pub struct NarrationState {
    /// Description passed to the scenario constructor.
    pub(crate) description: Slot<String>,
    /// Steps in declaration order.
    pub(crate) steps: Slot<Vec<PlannedStep>>,
    /// Sink that collected the transcript.
    pub(crate) output: Slot<MemoryOutput>,
    /// Outcome of the most recent play.
    pub(crate) outcome: Slot<PlayOutcome>,
}

/// Fixture providing fresh state for each narration scenario.
#[rstest::fixture]
pub fn narration_state() -> NarrationState {
    NarrationState::default()
}
