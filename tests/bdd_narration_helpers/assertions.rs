//! Then step definitions for narration BDD tests.

use fluent_scenario::Markers;
use rstest_bdd_macros::then;

use super::state::{NarrationState, PlayOutcome, StepResult};

fn outcome(narration_state: &NarrationState) -> StepResult<PlayOutcome> {
    narration_state
        .outcome
        .get()
        .ok_or_else(|| String::from("outcome should be set"))
}

fn transcript(narration_state: &NarrationState) -> StepResult<Vec<String>> {
    narration_state
        .output
        .get()
        .map(|output| output.lines())
        .ok_or_else(|| String::from("output should be set"))
}

fn expect_line(narration_state: &NarrationState, index: usize, expected: &str) -> StepResult<()> {
    let lines = transcript(narration_state)?;
    let actual = index
        .checked_sub(1)
        .and_then(|position| lines.get(position))
        .ok_or_else(|| format!("transcript has no line {index}: {lines:?}"))?;
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected line {index} to be '{expected}', got '{actual}'"))
    }
}

#[then("the scenario passes")]
fn scenario_passes(narration_state: &NarrationState) -> StepResult<()> {
    match outcome(narration_state)? {
        PlayOutcome::Passed => Ok(()),
        other => Err(format!("expected the scenario to pass, got {other:?}")),
    }
}

#[then("the scenario fails with {expected}")]
fn scenario_fails_with(narration_state: &NarrationState, expected: String) -> StepResult<()> {
    match outcome(narration_state)? {
        PlayOutcome::Failed { message } if message.contains(&expected) => Ok(()),
        other => Err(format!("expected a failure mentioning '{expected}', got {other:?}")),
    }
}

#[then("the scenario panics with {expected}")]
fn scenario_panics_with(narration_state: &NarrationState, expected: String) -> StepResult<()> {
    match outcome(narration_state)? {
        PlayOutcome::Panicked { message } if message.contains(&expected) => Ok(()),
        other => Err(format!("expected a panic mentioning '{expected}', got {other:?}")),
    }
}

#[then("construction is rejected with {expected}")]
fn construction_is_rejected(narration_state: &NarrationState, expected: String) -> StepResult<()> {
    match outcome(narration_state)? {
        PlayOutcome::Rejected { message } if message.contains(&expected) => Ok(()),
        other => Err(format!("expected construction to be rejected, got {other:?}")),
    }
}

#[then("the transcript has {count:usize} lines")]
fn transcript_has_lines(narration_state: &NarrationState, count: usize) -> StepResult<()> {
    let lines = transcript(narration_state)?;
    if lines.len() == count {
        Ok(())
    } else {
        Err(format!("expected {count} transcript lines, got {lines:?}"))
    }
}

#[then("transcript line {index:usize} passed as {text}")]
fn transcript_line_passed(
    narration_state: &NarrationState,
    index: usize,
    text: String,
) -> StepResult<()> {
    expect_line(narration_state, index, &Markers::plain().passed(&text))
}

#[then("transcript line {index:usize} failed as {text}")]
fn transcript_line_failed(
    narration_state: &NarrationState,
    index: usize,
    text: String,
) -> StepResult<()> {
    expect_line(narration_state, index, &Markers::plain().failed(&text))
}
