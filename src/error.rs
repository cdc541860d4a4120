//! Semantic error types for the container wrapper.
//!
//! This module defines the error hierarchy following the principle of using
//! semantic error enums (via `thiserror`) for conditions the caller might
//! inspect or retry. Failures reported by the engine are never rewritten: the
//! original `bollard` error is kept as the `source` of the semantic variant so
//! callers can walk the chain down to the engine's own response.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// HTTP status the engine uses for unknown containers and images.
const STATUS_NOT_FOUND: u16 = 404;

/// HTTP status the engine uses for name collisions.
const STATUS_CONFLICT: u16 = 409;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors that can occur during container engine operations.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Failed to connect to the container engine.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// The container engine socket was not found.
    #[error("container engine socket not found: {path}")]
    SocketNotFound {
        /// The path where the socket was expected.
        path: PathBuf,
    },

    /// Permission denied when accessing the container engine socket.
    #[error("permission denied accessing container socket: {path}")]
    PermissionDenied {
        /// The path to the socket.
        path: PathBuf,
    },

    /// The engine rejected or failed an image pull.
    #[error("failed to pull image '{image}': {source}")]
    PullFailed {
        /// The image reference that was requested.
        image: String,
        /// The error reported by the engine client.
        #[source]
        source: bollard::errors::Error,
    },

    /// The engine rejected a container-create request.
    #[error("failed to create container '{name}': {source}")]
    CreateFailed {
        /// The requested container name.
        name: String,
        /// The error reported by the engine client.
        #[source]
        source: bollard::errors::Error,
    },

    /// The engine refused to start a container.
    #[error("failed to start container '{container_id}': {source}")]
    StartFailed {
        /// The ID of the container that failed to start.
        container_id: String,
        /// The error reported by the engine client.
        #[source]
        source: bollard::errors::Error,
    },

    /// The engine refused to stop a container.
    #[error("failed to stop container '{container_id}': {source}")]
    StopFailed {
        /// The ID of the container that failed to stop.
        container_id: String,
        /// The error reported by the engine client.
        #[source]
        source: bollard::errors::Error,
    },

    /// The engine refused to remove a container.
    #[error("failed to remove container '{container_id}': {source}")]
    RemoveFailed {
        /// The ID of the container that could not be removed.
        container_id: String,
        /// The error reported by the engine client.
        #[source]
        source: bollard::errors::Error,
    },

    /// The caller cancelled an in-flight engine request.
    #[error("{operation} was cancelled before the engine responded")]
    Cancelled {
        /// The operation that was abandoned.
        operation: &'static str,
    },

    /// Health check failed - engine did not respond correctly.
    #[error("container engine health check failed: {message}")]
    HealthCheckFailed {
        /// A description of the health check failure.
        message: String,
    },

    /// Health check timed out.
    #[error("container engine health check timed out after {seconds} seconds")]
    HealthCheckTimeout {
        /// The timeout duration in seconds.
        seconds: u64,
    },
}

impl ContainerError {
    /// Return the engine error behind this failure, if any.
    #[must_use]
    pub const fn engine_error(&self) -> Option<&bollard::errors::Error> {
        match self {
            Self::PullFailed { source, .. }
            | Self::CreateFailed { source, .. }
            | Self::StartFailed { source, .. }
            | Self::StopFailed { source, .. }
            | Self::RemoveFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the engine reported the target container or image as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.engine_status() == Some(STATUS_NOT_FOUND)
    }

    /// Whether the engine reported a conflict, such as a duplicate name.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.engine_status() == Some(STATUS_CONFLICT)
    }

    fn engine_status(&self) -> Option<u16> {
        match self.engine_error() {
            Some(bollard::errors::Error::DockerResponseServerError { status_code, .. }) => {
                Some(*status_code)
            }
            _ => None,
        }
    }
}

/// Top-level error type for the container wrapper.
///
/// Aggregates all domain-specific errors into a single type that can be used
/// throughout the crate. Binaries embedding the wrapper typically convert it
/// into an opaque report at their boundary.
#[derive(Debug, Error)]
pub enum WrapperError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred during container engine operations.
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl WrapperError {
    /// Return the container error wrapped by this value, if any.
    #[must_use]
    pub const fn as_container(&self) -> Option<&ContainerError> {
        match self {
            Self::Container(error) => Some(error),
            Self::Config(_) => None,
        }
    }
}

/// A specialised `Result` type for container wrapper operations.
pub type Result<T> = std::result::Result<T, WrapperError>;
