//! Configuration data types.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default per-request timeout, in seconds, given to the engine client.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 120;

/// Default time, in seconds, allowed for the engine to answer a ping.
const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 10;

/// Settings used to reach a container engine.
///
/// The precedence order when loaded through [`super::load_config`] is
/// (lowest to highest): defaults, configuration file, environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "CWRAP",
    post_merge_hook,
    discovery(
        app_name = "container-wrapper",
        env_var = "CWRAP_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".container-wrapper.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct EngineConfig {
    /// The container engine socket path or URL.
    ///
    /// When unset, `DOCKER_HOST`, `CONTAINER_HOST` and `PODMAN_HOST` are
    /// consulted before the platform default socket.
    pub engine_socket: Option<String>,

    /// Per-request timeout, in seconds, applied by the engine client.
    #[ortho_config(skip_cli)]
    pub connect_timeout_secs: u64,

    /// Time, in seconds, the engine has to answer a health-check ping.
    #[ortho_config(skip_cli)]
    pub health_check_timeout_secs: u64,

    /// Ping the engine while connecting and fail early if it does not answer.
    #[ortho_config(skip_cli)]
    pub verify_on_connect: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_socket: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            health_check_timeout_secs: DEFAULT_HEALTH_CHECK_TIMEOUT_SECS,
            verify_on_connect: false,
        }
    }
}

impl EngineConfig {
    /// Set an explicit engine endpoint.
    #[must_use]
    pub fn with_engine_socket(mut self, socket: impl Into<String>) -> Self {
        self.engine_socket = Some(socket.into());
        self
    }

    /// Check that the configuration can be used to connect.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when either timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let zero_timeouts = [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("health_check_timeout_secs", self.health_check_timeout_secs),
        ];
        if let Some((field, _)) = zero_timeouts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::InvalidValue {
                field: String::from(*field),
                reason: String::from("timeout must be at least one second"),
            }
            .into());
        }
        Ok(())
    }
}

impl PostMergeHook for EngineConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // A blank socket in a file or variable means "not configured".
        if self
            .engine_socket
            .as_deref()
            .is_some_and(|socket| socket.trim().is_empty())
        {
            self.engine_socket = None;
        }
        Ok(())
    }
}
