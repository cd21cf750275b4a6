//! Given and When step definitions for narration BDD tests.

use std::panic::{self, AssertUnwindSafe};

use fluent_scenario::{Command, Markers, MemoryOutput, Scenario, fallible};
use rstest_bdd_macros::{given, when};

use super::state::{Behaviour, NarrationState, PlannedStep, PlayOutcome, StepResult};

type StepBody = Box<dyn FnOnce() -> eyre::Result<()> + Send>;

fn plan_step(
    narration_state: &NarrationState,
    keyword: String,
    name: String,
    behaviour: Behaviour,
) {
    let mut steps = narration_state.steps.get().unwrap_or_default();
    steps.push(PlannedStep {
        keyword,
        name,
        behaviour,
    });
    narration_state.steps.set(steps);
}

fn step_body(behaviour: Behaviour, name: &str) -> StepBody {
    let label = name.to_owned();
    match behaviour {
        Behaviour::Pass => Box::new(|| -> eyre::Result<()> { Ok(()) }),
        Behaviour::Fail => Box::new(move || -> eyre::Result<()> {
            Err(eyre::eyre!("step failed: {label}"))
        }),
        Behaviour::Panic => Box::new(move || -> eyre::Result<()> {
            panic::panic_any(format!("step panicked: {label}"))
        }),
    }
}

fn append(scenario: Scenario, step: PlannedStep) -> StepResult<Scenario> {
    let PlannedStep {
        keyword,
        name,
        behaviour,
    } = step;
    let body = fallible(step_body(behaviour, &name));
    let command = match keyword.as_str() {
        "given" => Command::Given,
        "when" => Command::When,
        "then" => Command::Then,
        "and" => return Ok(scenario.and(name, body)),
        other => return Err(format!("unknown step keyword '{other}'")),
    };
    Ok(scenario.step(command, name, body))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|text| (*text).to_owned()))
        .unwrap_or_default()
}

fn play_once(scenario: &mut Scenario) -> PlayOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| scenario.play_blocking())) {
        Ok(Ok(())) => PlayOutcome::Passed,
        Ok(Err(report)) => PlayOutcome::Failed {
            message: report.to_string(),
        },
        Err(payload) => PlayOutcome::Panicked {
            message: panic_message(payload.as_ref()),
        },
    }
}

fn build_and_play(narration_state: &NarrationState, times: usize) -> StepResult<()> {
    let description = narration_state
        .description
        .get()
        .ok_or_else(|| String::from("description should be set"))?;
    let output = MemoryOutput::new();
    narration_state.output.set(output.clone());

    let mut scenario = match Scenario::new(description, output) {
        Ok(built) => built.with_markers(Markers::plain()),
        Err(error) => {
            narration_state.outcome.set(PlayOutcome::Rejected {
                message: error.to_string(),
            });
            return Ok(());
        }
    };
    for step in narration_state.steps.get().unwrap_or_default() {
        scenario = append(scenario, step)?;
    }

    let mut outcome = PlayOutcome::Passed;
    for _ in 0..times {
        outcome = play_once(&mut scenario);
        if !matches!(outcome, PlayOutcome::Passed) {
            break;
        }
    }
    narration_state.outcome.set(outcome);
    Ok(())
}

#[given("a scenario described as {description}")]
fn scenario_described_as(narration_state: &NarrationState, description: String) {
    narration_state.description.set(description);
}

#[given("a scenario with a blank description")]
fn scenario_with_blank_description(narration_state: &NarrationState) {
    narration_state.description.set(String::from("   "));
}

#[given("a passing {keyword} step named {name}")]
fn passing_step(narration_state: &NarrationState, keyword: String, name: String) {
    plan_step(narration_state, keyword, name, Behaviour::Pass);
}

#[given("a failing {keyword} step named {name}")]
fn failing_step(narration_state: &NarrationState, keyword: String, name: String) {
    plan_step(narration_state, keyword, name, Behaviour::Fail);
}

#[given("a panicking {keyword} step named {name}")]
fn panicking_step(narration_state: &NarrationState, keyword: String, name: String) {
    plan_step(narration_state, keyword, name, Behaviour::Panic);
}

#[when("the scenario is played")]
fn scenario_is_played(narration_state: &NarrationState) -> StepResult<()> {
    build_and_play(narration_state, 1)
}

#[when("the scenario is played twice")]
fn scenario_is_played_twice(narration_state: &NarrationState) -> StepResult<()> {
    build_and_play(narration_state, 2)
}
