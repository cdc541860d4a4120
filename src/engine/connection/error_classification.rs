//! Maps client construction failures onto connection error variants.
//!
//! `bollard` reports a missing socket or a refused permission in several
//! shapes: as its own `SocketNotFoundError`, as a wrapped `io::Error`, or as
//! an `io::Error` buried further down the source chain. All of them are
//! folded into `SocketNotFound`, `PermissionDenied` or `ConnectionFailed`.

use std::error::Error as StdError;
use std::io::ErrorKind;
use std::path::PathBuf;

use bollard::errors::Error as BollardError;

use crate::error::ContainerError;

/// Filesystem path behind a `unix://` or `npipe://` endpoint.
///
/// HTTP endpoints have no path and yield `None`.
pub(super) fn socket_path(socket_uri: &str) -> Option<PathBuf> {
    ["unix://", "npipe://"]
        .iter()
        .find_map(|scheme| socket_uri.strip_prefix(scheme))
        .map(PathBuf::from)
}

/// Classify a `bollard` connection error for the endpoint `socket_uri`.
pub(super) fn classify_connection_error(
    error: &BollardError,
    socket_uri: &str,
) -> ContainerError {
    let path = socket_path(socket_uri);
    let kind = match error {
        BollardError::SocketNotFoundError(_) => Some(ErrorKind::NotFound),
        BollardError::IOError { err } => Some(innermost_io_kind(err).unwrap_or_else(|| err.kind())),
        other => innermost_io_kind(other),
    };

    match (kind, path) {
        (Some(ErrorKind::NotFound), Some(socket)) => ContainerError::SocketNotFound { path: socket },
        (Some(ErrorKind::PermissionDenied), Some(socket)) => {
            ContainerError::PermissionDenied { path: socket }
        }
        _ => ContainerError::ConnectionFailed {
            message: error.to_string(),
        },
    }
}

/// Kind of the first `io::Error` found below `error` in its source chain.
fn innermost_io_kind(error: &dyn StdError) -> Option<ErrorKind> {
    std::iter::successors(error.source(), |current| (*current).source())
        .find_map(|cause| cause.downcast_ref::<std::io::Error>())
        .map(std::io::Error::kind)
}
