//! Configuration loading with layered precedence.
//!
//! Layers are composed by hand with `ortho_config::MergeComposer` rather than
//! through the derive's `load()`, because `load()` parses process arguments
//! and this crate is a library with no command line of its own. Composing the
//! layers here also lets typed environment values fail fast: `CWRAP_*`
//! variables that do not parse (for example `CWRAP_VERIFY_ON_CONNECT=maybe`)
//! are reported as `ConfigError::InvalidValue` instead of being dropped.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::DefaultEnv;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use super::EngineConfig;
use crate::error::{ConfigError, Result};

/// Application name used for XDG discovery.
const APP_NAME: &str = "container-wrapper";

/// Environment variable naming an explicit configuration file.
const CONFIG_PATH_ENV: &str = "CWRAP_CONFIG_PATH";

/// How an environment variable's raw text is interpreted.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// Taken verbatim.
    String,
    /// `true` or `false`.
    Bool,
    /// Unsigned 64-bit integer.
    U64,
}

/// Mapping from one environment variable to a configuration field.
struct EnvVarSpec {
    env_var: &'static str,
    field: &'static str,
    var_type: EnvVarType,
}

const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "CWRAP_ENGINE_SOCKET",
        field: "engine_socket",
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "CWRAP_CONNECT_TIMEOUT_SECS",
        field: "connect_timeout_secs",
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "CWRAP_HEALTH_CHECK_TIMEOUT_SECS",
        field: "health_check_timeout_secs",
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "CWRAP_VERIFY_ON_CONNECT",
        field: "verify_on_connect",
        var_type: EnvVarType::Bool,
    },
];

/// Returns the environment variable names recognised by the loader.
///
/// Tests use this to clear every `CWRAP_*` variable without keeping a second
/// list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load configuration from defaults, a configuration file and the process
/// environment.
///
/// `explicit_path` takes priority over discovery when it names an existing
/// file.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` for unreadable or malformed files,
/// `ConfigError::InvalidValue` for typed environment variables that do not
/// parse, and `ConfigError::OrthoConfig` when the layers cannot be merged.
pub fn load_config(explicit_path: Option<&Utf8Path>) -> Result<EngineConfig> {
    load_config_with_env(explicit_path, &DefaultEnv::new())
}

/// Load configuration reading `CWRAP_*` variables from `env`.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<E: mockable::Env>(
    explicit_path: Option<&Utf8Path>,
    env: &E,
) -> Result<EngineConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(EngineConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = locate_config_file(explicit_path) {
        tracing::debug!(path = %path, "loading configuration file");
        load_config_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let config =
        EngineConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    Ok(config)
}

fn locate_config_file(explicit_path: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
    explicit_path
        .filter(|path| path.exists())
        .map(Utf8Path::to_path_buf)
        .or_else(|| {
            ConfigDiscovery::builder(APP_NAME)
                .env_var(CONFIG_PATH_ENV)
                .config_file_name("config.toml")
                .dotfile_name(".container-wrapper.toml")
                .build()
                .candidates()
                .into_iter()
                .filter(|candidate| candidate.exists())
                .find_map(|candidate| Utf8PathBuf::try_from(candidate).ok())
        })
}

/// Read a TOML file through `cap_std` and push it as the file layer.
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

    composer.push_file(value, Some(path.to_path_buf()));
    Ok(())
}

/// Collect recognised `CWRAP_*` variables into a JSON object.
///
/// Returns `Value::Null` when none are set.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };
        root.insert(String::from(spec.field), parse_env_value(spec, raw_value)?);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

fn parse_env_value(spec: &EnvVarSpec, raw_value: String) -> Result<Value> {
    let invalid = |expected: &str, raw: &str| ConfigError::InvalidValue {
        field: String::from(spec.env_var),
        reason: format!("expected {expected}, got '{raw}'"),
    };

    let value = match spec.var_type {
        EnvVarType::String => Value::String(raw_value),
        EnvVarType::Bool => raw_value
            .trim()
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| invalid("bool (true/false)", &raw_value))?,
        EnvVarType::U64 => raw_value
            .trim()
            .parse::<u64>()
            .map(|number| Value::Number(number.into()))
            .map_err(|_| invalid("unsigned integer", &raw_value))?,
    };
    Ok(value)
}
