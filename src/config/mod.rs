//! Engine connection configuration.
//!
//! [`EngineConfig`] is the explicit value handed to
//! [`crate::engine::Engine::connect`]. It can be built by hand or loaded with
//! [`load_config`], which merges (lowest to highest) application defaults, a
//! TOML configuration file and `CWRAP_*` environment variables through
//! `ortho_config`.
//!
//! Configuration files are discovered in this order:
//! 1. An explicit path passed to [`load_config`]
//! 2. Path specified via the `CWRAP_CONFIG_PATH` environment variable
//! 3. `.container-wrapper.toml` in the current or home directory
//! 4. `~/.config/container-wrapper/config.toml` (XDG default)
//!
//! # Example Configuration
//!
//! ```toml
//! engine_socket = "unix:///run/user/1000/podman/podman.sock"
//! connect_timeout_secs = 60
//! health_check_timeout_secs = 5
//! verify_on_connect = true
//! ```

mod loader;
mod types;


pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::EngineConfig;
