//! Narrative given/when/then scenarios for Rust tests.
//!
//! `fluent-scenario` lets a test describe itself as a sequence of named steps
//! (`given`, `when`, `then`, `and`) that are declared first and run later.
//! Each step may consume the previous step's result and produce its own, so
//! one typed value flows through the chain. While a scenario plays it writes
//! a readable transcript, one line per step, marked as passed or failed.
//!
//! ```
//! use fluent_scenario::{Ensure, Markers, MemoryOutput, Scenario};
//!
//! # fn main() -> eyre::Result<()> {
//! let output = MemoryOutput::new();
//! Scenario::new("loads config", output.clone())?
//!     .with_markers(Markers::plain())
//!     .given("file exists", || String::from("a = 1"))
//!     .when("parsed", |text: Ensure<String>| text.len())
//!     .then("values present", |len: Ensure<usize>| assert!(*len > 0))
//!     .play_blocking()?;
//!
//! assert_eq!(
//!     output.lines(),
//!     vec![
//!         "\u{2713} SCENARIO for loads config",
//!         "\u{2713} GIVEN file exists",
//!         "\u{2713} WHEN parsed",
//!         "\u{2713} THEN values present",
//!     ]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Every accepted step shape is normalised into one owned async transform
//! from an erased [`StepValue`] to the next. The scenario holds those
//! transforms in declaration order, labels them as they are appended, and
//! drains the list when played, so a scenario runs at most once. Failures are
//! ordinary Rust failures: a panicking step (a failed `assert!`) is reported
//! and the panic resumed; a [`fallible`] step's `Err` is reported and
//! returned.
//!
//! # Modules
//!
//! - [`scenario`]: The scenario builder, the step runner and the play loop
//! - [`step`]: Step records, commands and the step-shape adapters
//! - [`value`]: Erased step results and the [`Ensure`] wrapper
//! - [`narrative`]: Step labels and identifier-to-sentence naming
//! - [`context`]: Named values shared between steps
//! - [`output`]: Transcript sinks and pass/fail markers
//! - [`config`]: Narration settings loaded with layered precedence
//! - [`error`]: Semantic error types

pub mod config;
pub mod context;
pub mod error;
pub mod narrative;
pub mod output;
pub mod scenario;
pub mod step;
pub mod value;

pub use context::ScenarioContext;
pub use error::{ConfigError, ConstructionError, ContextError, ScenarioError};
pub use output::{
    ConsoleOutput, Markers, MemoryOutput, ScenarioOutput, TracingOutput, output_fn,
};
pub use scenario::{Scenario, StepRunner};
pub use step::{Command, fallible};
pub use value::{Ensure, StepValue};
