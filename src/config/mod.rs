//! Narration configuration.
//!
//! Scenarios built with [`Scenario::from_config`](crate::Scenario::from_config)
//! take their sink and markers from a [`NarratorConfig`]. Loading and
//! precedence merging is handled by the `ortho_config` crate: environment
//! variables override configuration files, which override defaults.
//!
//! The configuration file is expected at
//! `~/.config/fluent-scenario/config.toml` by default.
//!
//! # Example Configuration
//!
//! ```toml
//! sink = "tracing"
//!
//! [markers]
//! color = false
//! success = "PASS"
//! failure = "FAIL"
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_PATH_ENV, env_var_names, load_config, load_config_with_env};
pub use types::{MarkerConfig, NarratorConfig, SinkKind};
