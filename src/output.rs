//! Output sinks that receive the scenario transcript.
//!
//! The runner writes one line per executed step, `"{marker} {description}"`.
//! Where the line goes is up to the sink: the console, a `tracing`
//! subscriber, an in-memory buffer for assertions, or a closure wrapped with
//! [`output_fn`].

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives transcript lines, one call per line.
pub trait ScenarioOutput: Send + Sync {
    /// Record or display one line. Must not panic under normal writing.
    fn write_line(&self, line: &str);
}

/// Adapts a closure into a sink; see [`output_fn`].
#[derive(Clone, Copy)]
pub struct FnOutput<F>(F);

/// Use `write` as a sink.
#[must_use]
pub const fn output_fn<F>(write: F) -> FnOutput<F>
where
    F: Fn(&str) + Send + Sync,
{
    FnOutput(write)
}

impl<F> ScenarioOutput for FnOutput<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn write_line(&self, line: &str) {
        (self.0)(line);
    }
}

impl<O: ScenarioOutput + ?Sized> ScenarioOutput for Arc<O> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }
}

impl<O: ScenarioOutput + ?Sized> ScenarioOutput for Box<O> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }
}

/// Success and failure markers placed before each step's description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Written before a step that completed.
    pub success: String,
    /// Written before a step that failed.
    pub failure: String,
}

impl Markers {
    /// Plain check mark.
    pub const SUCCESS_GLYPH: &'static str = "\u{2713}";
    /// Plain cross mark.
    pub const FAILURE_GLYPH: &'static str = "\u{2717}";

    /// Green check and red cross using ANSI colour escapes.
    #[must_use]
    pub fn ansi() -> Self {
        Self::from_glyphs(Self::SUCCESS_GLYPH, Self::FAILURE_GLYPH, true)
    }

    /// Uncoloured check and cross, for logs that do not render escapes.
    #[must_use]
    pub fn plain() -> Self {
        Self::from_glyphs(Self::SUCCESS_GLYPH, Self::FAILURE_GLYPH, false)
    }

    /// Build markers from arbitrary glyphs, optionally coloured.
    #[must_use]
    pub fn from_glyphs(success: &str, failure: &str, color: bool) -> Self {
        if color {
            Self {
                success: format!("\u{1b}[32m{success}\u{1b}[0m"),
                failure: format!("\u{1b}[31m{failure}\u{1b}[0m"),
            }
        } else {
            Self {
                success: success.to_owned(),
                failure: failure.to_owned(),
            }
        }
    }

    /// The transcript line for a step that completed.
    #[must_use]
    pub fn passed(&self, description: &str) -> String {
        format!("{} {description}", self.success)
    }

    /// The transcript line for a step that failed.
    #[must_use]
    pub fn failed(&self, description: &str) -> String {
        format!("{} {description}", self.failure)
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::ansi()
    }
}

/// Writes lines to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput;

impl ScenarioOutput for ConsoleOutput {
    fn write_line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // A closed stdout is not a step failure.
        if writeln!(handle, "{line}").is_err() {
            tracing::trace!("stdout closed, transcript line dropped");
        }
    }
}

/// Emits each line as an INFO `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutput;

impl ScenarioOutput for TracingOutput {
    fn write_line(&self, line: &str) {
        tracing::info!(target: "fluent_scenario::transcript", "{line}");
    }
}

/// Collects lines in memory. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryOutput {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every line written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Discard all collected lines.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScenarioOutput for MemoryOutput {
    fn write_line(&self, line: &str) {
        self.lock().push(line.to_owned());
    }
}
