//! Behavioural step helpers for scenario narration.

mod assertions;
mod state;
mod steps;

pub use state::{NarrationState, narration_state};
