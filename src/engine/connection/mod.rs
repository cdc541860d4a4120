//! Endpoint resolution and container engine connection.
//!
//! This module resolves the engine endpoint from explicit configuration,
//! environment variables or platform defaults, and establishes connections
//! using the Bollard library. Failures are classified into semantic
//! `ContainerError` variants before they reach the caller.

mod error_classification;
mod health_check;

use bollard::Docker;

use self::error_classification::classify_connection_error;
use crate::error::Result as WrapperResult;

/// Environment variable names checked in fallback order after configuration.
const FALLBACK_ENV_VARS: &[&str] = &["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// Default socket path for Unix platforms.
#[cfg(unix)]
const DEFAULT_SOCKET: &str = "unix:///var/run/docker.sock";

/// Default socket path for Windows platforms.
#[cfg(windows)]
const DEFAULT_SOCKET: &str = "npipe:////./pipe/docker_engine";

/// Resolves container engine endpoints from environment variables.
///
/// The resolver checks a prioritised list of environment variables to find
/// the endpoint when no explicit configuration is provided.
///
/// # Type Parameters
///
/// * `E` - An environment provider implementing the `mockable::Env` trait,
///   allowing for testable environment variable access.
///
/// # Example
///
/// ```ignore
/// use container_wrapper::engine::SocketResolver;
/// use mockable::DefaultEnv;
///
/// let env = DefaultEnv::new();
/// let resolver = SocketResolver::new(&env);
///
/// if let Some(socket) = resolver.resolve_from_env() {
///     println!("Found socket: {}", socket);
/// }
/// ```
pub struct SocketResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> SocketResolver<'a, E> {
    /// Creates a new socket resolver with the given environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Resolves the endpoint from fallback environment variables.
    ///
    /// Checks `DOCKER_HOST`, `CONTAINER_HOST` and `PODMAN_HOST` in that order
    /// and returns the first non-empty value.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|var_name| self.env.string(var_name))
            .find(|value| !value.is_empty())
    }

    /// Returns the platform default socket path.
    #[must_use]
    pub const fn default_socket() -> &'static str {
        DEFAULT_SOCKET
    }
}

/// Classifies endpoint types for connection handling.
#[derive(Debug, PartialEq, Eq)]
enum SocketType {
    /// Unix socket or Windows named pipe with explicit scheme.
    Socket,
    /// HTTP, HTTPS, or TCP endpoint (TCP is rewritten to HTTP).
    Http,
    /// Bare path without scheme prefix.
    BarePath,
}

impl SocketType {
    fn is_socket_scheme(socket: &str) -> bool {
        socket.starts_with("unix://") || socket.starts_with("npipe://")
    }

    fn is_http_scheme(socket: &str) -> bool {
        socket.starts_with("tcp://")
            || socket.starts_with("http://")
            || socket.starts_with("https://")
    }

    fn classify(socket: &str) -> Self {
        match (Self::is_socket_scheme(socket), Self::is_http_scheme(socket)) {
            (true, _) => Self::Socket,
            (_, true) => Self::Http,
            _ => Self::BarePath,
        }
    }
}

/// Establishes connections to Docker-compatible engines.
///
/// Supports Unix sockets, Windows named pipes, TCP, HTTP and HTTPS endpoints.
pub struct EngineConnector;

impl EngineConnector {
    /// Connect to the engine at `socket`, giving each request
    /// `timeout_secs` to complete.
    ///
    /// Supported endpoint formats:
    /// - Unix sockets: `unix:///path/to/socket`
    /// - Windows named pipes: `npipe:////./pipe/name`
    /// - TCP: `tcp://host:port` (treated as HTTP)
    /// - HTTP: `http://host:port`
    /// - HTTPS: `https://host:port`
    /// - Bare paths: paths starting with `\\` or `//` are named pipes, all
    ///   others are Unix sockets. Detection is syntax-based.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::SocketNotFound`, `PermissionDenied` or
    /// `ConnectionFailed` if the client cannot be created.
    pub fn connect(socket: &str, timeout_secs: u64) -> WrapperResult<Docker> {
        let socket_uri = Self::normalize(socket);
        let docker = match SocketType::classify(&socket_uri) {
            SocketType::Http => Docker::connect_with_http(
                &socket_uri,
                timeout_secs,
                bollard::API_DEFAULT_VERSION,
            ),
            SocketType::Socket | SocketType::BarePath => Docker::connect_with_socket(
                &socket_uri,
                timeout_secs,
                bollard::API_DEFAULT_VERSION,
            ),
        }
        .map_err(|error| classify_connection_error(&error, &socket_uri))?;

        Ok(docker)
    }

    /// Rewrite an endpoint into the URI form Bollard accepts.
    ///
    /// `tcp://` becomes `http://`; bare paths gain a `unix://` or `npipe://`
    /// scheme. Other endpoints are returned unchanged.
    fn normalize(socket: &str) -> String {
        match SocketType::classify(socket) {
            SocketType::Socket => String::from(socket),
            SocketType::Http => socket
                .strip_prefix("tcp://")
                .map_or_else(|| String::from(socket), |rest| format!("http://{rest}")),
            SocketType::BarePath => Self::normalize_bare_path(socket),
        }
    }

    /// Paths starting with `\\` or `//` are assumed to be named pipes.
    fn normalize_bare_path(path: &str) -> String {
        if path.starts_with("\\\\") || path.starts_with("//") {
            format!("npipe://{path}")
        } else {
            format!("unix://{path}")
        }
    }

    /// Resolves the endpoint without establishing a connection.
    ///
    /// Resolution order:
    /// 1. `config_socket` (from the config file or `CWRAP_ENGINE_SOCKET`)
    /// 2. `DOCKER_HOST`, `CONTAINER_HOST`, `PODMAN_HOST` (via resolver)
    /// 3. Platform default socket
    #[must_use]
    pub fn resolve_socket<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> String {
        config_socket
            .filter(|socket| !socket.trim().is_empty())
            .map(String::from)
            .or_else(|| resolver.resolve_from_env())
            .unwrap_or_else(|| String::from(SocketResolver::<E>::default_socket()))
    }
}
