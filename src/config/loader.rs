//! Configuration loading with layered precedence.
//!
//! Layers, lowest to highest: defaults, configuration file, environment
//! variables. Layers are composed by hand with `MergeComposer` so that typed
//! environment values fail fast: `FLUENT_SCENARIO_MARKERS_COLOR=maybe` is an
//! error, not a silent fallback to the default.
//!
//! Environment access goes through [`mockable::Env`] so tests can supply
//! variables without touching the process environment.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::NarratorConfig;
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
}

/// Maps one environment variable onto a configuration path.
struct EnvVarSpec {
    env_var: &'static str,
    path: &'static [&'static str],
    var_type: EnvVarType,
}

const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "FLUENT_SCENARIO_SINK",
        path: &["sink"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "FLUENT_SCENARIO_MARKERS_COLOR",
        path: &["markers", "color"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "FLUENT_SCENARIO_MARKERS_SUCCESS",
        path: &["markers", "success"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "FLUENT_SCENARIO_MARKERS_FAILURE",
        path: &["markers", "failure"],
        var_type: EnvVarType::String,
    },
];

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "FLUENT_SCENARIO_CONFIG_PATH";

/// Returns the environment variable names recognised by the loader.
///
/// Tests use this to clear every `FLUENT_SCENARIO_*` variable without keeping
/// a second list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Read a TOML configuration file and push it to the composer.
fn load_config_file(path: &Utf8Path, composer: &mut MergeComposer) -> Result<()> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value = toml::from_str::<Value>(&content).map_err(|e| ConfigError::ParseError {
        message: format!("failed to parse {path}: {e}"),
    })?;

    tracing::debug!(%path, "configuration file loaded");
    composer.push_file(value, Some(path.to_path_buf()));
    Ok(())
}

/// Load narration settings from the process environment and discovered files.
///
/// `explicit_path` takes priority over discovery when the file exists.
///
/// # Errors
///
/// Returns `ConfigError` if loading fails due to:
/// - A malformed configuration file
/// - An invalid typed environment value, such as a non-boolean
///   `FLUENT_SCENARIO_MARKERS_COLOR`
/// - An unknown sink name or an empty marker glyph
pub fn load_config(explicit_path: Option<&Utf8Path>) -> Result<NarratorConfig> {
    load_config_with_env(explicit_path, &DefaultEnv::new())
}

/// Load narration settings reading variables from `env`.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env(
    explicit_path: Option<&Utf8Path>,
    env: &impl Env,
) -> Result<NarratorConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(NarratorConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    let config_path = explicit_path
        .filter(|path| path.exists())
        .map(Utf8Path::to_path_buf)
        .or_else(|| env_config_path(env))
        .or_else(discover_config_file);
    if let Some(ref path) = config_path {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let config =
        NarratorConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.markers.validate()?;
    tracing::debug!(sink = ?config.sink, "narration configuration loaded");
    Ok(config)
}

/// The file named by [`CONFIG_PATH_ENV`] in `env`, if it exists.
fn env_config_path(env: &impl Env) -> Option<Utf8PathBuf> {
    env.string(CONFIG_PATH_ENV)
        .filter(|value| !value.trim().is_empty())
        .map(Utf8PathBuf::from)
        .filter(|path| path.exists())
}

/// The first existing file among the dotfile and XDG candidates.
///
/// [`CONFIG_PATH_ENV`] is read through the injected environment by
/// [`env_config_path`], so discovery only looks at fixed locations.
fn discover_config_file() -> Option<Utf8PathBuf> {
    let discovery = ConfigDiscovery::builder("fluent-scenario")
        .config_file_name("config.toml")
        .dotfile_name(".fluent-scenario.toml")
        .build();
    discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok())
}

/// Collect `FLUENT_SCENARIO_*` variables into a JSON value.
fn collect_env_vars(env: &impl Env) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Bool => match raw_value.parse::<bool>() {
                Ok(b) => Value::Bool(b),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected bool (true/false), got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path, creating intermediate objects.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;

    use crate::config::SinkKind;
    use crate::error::ScenarioError;

    fn env_with(vars: &'static [(&'static str, &'static str)]) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        });
        env
    }

    #[rstest]
    fn empty_environment_collects_nothing() {
        let env = env_with(&[]);
        let value = collect_env_vars(&env).expect("collection should succeed");
        assert!(value.is_null());
    }

    #[rstest]
    fn nested_variables_land_under_their_table() {
        let env = env_with(&[
            ("FLUENT_SCENARIO_SINK", "tracing"),
            ("FLUENT_SCENARIO_MARKERS_COLOR", "false"),
            ("FLUENT_SCENARIO_MARKERS_SUCCESS", "ok"),
        ]);
        let value = collect_env_vars(&env).expect("collection should succeed");
        assert_eq!(
            value,
            serde_json::json!({
                "sink": "tracing",
                "markers": { "color": false, "success": "ok" }
            })
        );
    }

    #[rstest]
    fn invalid_bool_fails_fast() {
        let env = env_with(&[("FLUENT_SCENARIO_MARKERS_COLOR", "maybe")]);
        let result = collect_env_vars(&env);
        assert!(matches!(
            result,
            Err(ScenarioError::Config(ConfigError::InvalidValue { ref field, .. }))
                if field == "FLUENT_SCENARIO_MARKERS_COLOR"
        ));
    }

    #[rstest]
    fn insert_at_path_creates_intermediate_objects() {
        let mut root = Map::new();
        insert_at_path(&mut root, &["a", "b", "c"], Value::Bool(true));
        assert_eq!(
            Value::Object(root),
            serde_json::json!({ "a": { "b": { "c": true } } })
        );
    }

    #[rstest]
    fn insert_at_empty_path_is_ignored() {
        let mut root = Map::new();
        insert_at_path(&mut root, &[], Value::Bool(true));
        assert!(root.is_empty());
    }

    #[rstest]
    fn env_var_names_cover_every_spec() {
        let names = env_var_names();
        assert_eq!(names.len(), ENV_VAR_SPECS.len());
        assert!(names.iter().all(|name| name.starts_with("FLUENT_SCENARIO_")));
    }

    fn env_with_owned(vars: Vec<(&'static str, String)>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.clone())
        });
        env
    }

    #[rstest]
    fn config_path_is_read_from_injected_environment() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = Utf8PathBuf::try_from(dir.path().join("injected.toml"))
            .expect("temp path should be UTF-8");
        std::fs::write(&path, "sink = \"tracing\"\n").expect("config file should be written");

        let env = env_with_owned(vec![(CONFIG_PATH_ENV, path.to_string())]);
        let config = load_config_with_env(None, &env).expect("configuration should load");

        assert_eq!(config.sink, SinkKind::Tracing);
    }

    #[rstest]
    #[case::unset(None)]
    #[case::blank(Some(String::from("  ")))]
    #[case::missing_file(Some(String::from("/nonexistent/fluent-scenario/config.toml")))]
    fn unusable_config_path_yields_nothing(#[case] value: Option<String>) {
        let env = env_with_owned(
            value
                .map(|path| vec![(CONFIG_PATH_ENV, path)])
                .unwrap_or_default(),
        );
        assert!(env_config_path(&env).is_none());
    }

    #[rstest]
    fn explicit_file_and_environment_are_layered() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = Utf8PathBuf::try_from(dir.path().join("narration.toml"))
            .expect("temp path should be UTF-8");
        std::fs::write(
            &path,
            "sink = \"tracing\"\n[markers]\ncolor = false\nsuccess = \"PASS\"\n",
        )
        .expect("config file should be written");

        let env = env_with(&[("FLUENT_SCENARIO_MARKERS_SUCCESS", "ok")]);
        let config =
            load_config_with_env(Some(&path), &env).expect("configuration should load");

        assert_eq!(config.sink, SinkKind::Tracing);
        assert!(!config.markers.color);
        assert_eq!(config.markers.success, "ok");
        assert_eq!(config.markers.failure, "\u{2717}");
    }

    #[rstest]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = Utf8PathBuf::try_from(dir.path().join("broken.toml"))
            .expect("temp path should be UTF-8");
        std::fs::write(&path, "sink = [unterminated").expect("config file should be written");

        let result = load_config_with_env(Some(&path), &env_with(&[]));
        assert!(matches!(
            result,
            Err(ScenarioError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[rstest]
    fn blank_glyph_is_rejected_after_trimming() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = Utf8PathBuf::try_from(dir.path().join("blank.toml"))
            .expect("temp path should be UTF-8");
        std::fs::write(&path, "[markers]\nfailure = \"   \"\n")
            .expect("config file should be written");

        let result = load_config_with_env(Some(&path), &env_with(&[]));
        assert!(matches!(
            result,
            Err(ScenarioError::Config(ConfigError::InvalidValue { ref field, .. }))
                if field == "markers.failure"
        ));
    }

    #[rstest]
    fn unknown_sink_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = Utf8PathBuf::try_from(dir.path().join("sink.toml"))
            .expect("temp path should be UTF-8");
        std::fs::write(&path, "sink = \"printer\"\n").expect("config file should be written");

        let result = load_config_with_env(Some(&path), &env_with(&[]));
        assert!(matches!(
            result,
            Err(ScenarioError::Config(ConfigError::OrthoConfig(_)))
        ));
    }
}
