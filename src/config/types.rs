//! Configuration data types for scenario narration.

use clap::ValueEnum;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::error::{ConfigError, Result};
use crate::output::{ConsoleOutput, Markers, ScenarioOutput, TracingOutput};

/// Where transcript lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Standard output.
    #[default]
    Console,
    /// INFO events on the `fluent_scenario::transcript` target.
    Tracing,
}

/// Marker glyphs placed before each transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct MarkerConfig {
    /// Wrap the glyphs in ANSI colour escapes.
    #[default = true]
    pub color: bool,

    /// Glyph for a step that completed.
    #[default = "\u{2713}"]
    pub success: String,

    /// Glyph for a step that failed.
    #[default = "\u{2717}"]
    pub failure: String,
}

impl MarkerConfig {
    /// Rejects blank glyphs, which would leave a transcript line without a marker.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the empty glyph.
    pub fn validate(&self) -> Result<()> {
        for (field, glyph) in [
            ("markers.success", &self.success),
            ("markers.failure", &self.failure),
        ] {
            if glyph.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: String::from("marker glyph must not be empty"),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Narration settings shared by scenarios built with
/// [`Scenario::from_config`](crate::Scenario::from_config).
///
/// Loaded from configuration files and environment variables with layered
/// precedence (lowest to highest): defaults, configuration file, environment
/// variables.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `FLUENT_SCENARIO_CONFIG_PATH`
/// 2. `.fluent-scenario.toml` in the current working directory
/// 3. `.fluent-scenario.toml` in the home directory
/// 4. `~/.config/fluent-scenario/config.toml` (XDG default)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "FLUENT_SCENARIO",
    post_merge_hook,
    discovery(
        app_name = "fluent-scenario",
        env_var = "FLUENT_SCENARIO_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".fluent-scenario.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct NarratorConfig {
    /// The transcript sink.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub sink: SinkKind,

    /// Marker glyphs and colouring.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub markers: MarkerConfig,
}

impl NarratorConfig {
    /// The markers described by the `[markers]` table.
    #[must_use]
    pub fn markers(&self) -> Markers {
        Markers::from_glyphs(
            &self.markers.success,
            &self.markers.failure,
            self.markers.color,
        )
    }

    /// A fresh sink of the configured kind.
    #[must_use]
    pub fn output(&self) -> Box<dyn ScenarioOutput> {
        match self.sink {
            SinkKind::Console => Box::new(ConsoleOutput),
            SinkKind::Tracing => Box::new(TracingOutput),
        }
    }
}

impl PostMergeHook for NarratorConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Glyphs from TOML or the environment often carry stray padding.
        let success = self.markers.success.trim().to_owned();
        let failure = self.markers.failure.trim().to_owned();
        self.markers.success = success;
        self.markers.failure = failure;
        Ok(())
    }
}
