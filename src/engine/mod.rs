//! Container engine facade and container handles.
//!
//! [`Engine`] owns one connection to a Docker-compatible engine and offers
//! the collection-level operations: pull an image, create a container and
//! remove a container by identifier. Creating a container returns a
//! [`Container`] handle that shares the connection and offers start, stop and
//! remove for that one container.
//!
//! The endpoint is resolved through a priority-based fallback chain:
//!
//! 1. `engine_socket` from [`crate::config::EngineConfig`] (file or
//!    `CWRAP_ENGINE_SOCKET`)
//! 2. `DOCKER_HOST` environment variable
//! 3. `CONTAINER_HOST` environment variable
//! 4. `PODMAN_HOST` environment variable
//! 5. Platform default (`/var/run/docker.sock` on Unix)
//!
//! All engine traffic goes through the [`EngineApi`] seam so the facade and
//! handles can be driven by test doubles.

mod api;
mod cancel;
mod connection;
mod container;
mod env_vars;
mod facade;
#[cfg(test)]
mod mock_api;
mod ports;

pub use api::{EngineApi, EngineFuture, PullProgressStream};
pub use connection::{EngineConnector, SocketResolver};
pub use container::{Container, ContainerHandle, OperationFuture, STOP_GRACE_PERIOD_SECS};
pub use env_vars::EnvVars;
pub use facade::{ContainerEngine, CreateContainerInput, Engine};
pub use ports::{ContainerPort, HostBinding, PortMappings, Protocol};
