//! Handles for containers created through the engine facade.
//!
//! A handle is a stateless proxy: it remembers the engine-assigned identifier
//! plus a snapshot of the creation-time fields, and forwards lifecycle
//! requests to the shared engine connection. The container's real state lives
//! in the engine and is never cached here.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bollard::Docker;
use bollard::query_parameters::{
    RemoveContainerOptions, RemoveContainerOptionsBuilder, StopContainerOptions,
    StopContainerOptionsBuilder,
};

use super::api::EngineApi;
use super::env_vars::EnvVars;
use super::ports::PortMappings;
use crate::error::{ContainerError, Result as WrapperResult};

/// Grace period, in seconds, between the stop signal and forced termination.
pub const STOP_GRACE_PERIOD_SECS: i32 = 1;

/// Boxed future type returned by facade and handle operations.
pub type OperationFuture<'a, T> = Pin<Box<dyn Future<Output = WrapperResult<T>> + Send + 'a>>;

/// Operations available on one container known to the engine.
///
/// Accessors read the snapshot captured at creation time and never contact
/// the engine. Lifecycle operations issue exactly one engine request each.
pub trait ContainerHandle: Send + Sync {
    /// Engine-assigned identifier.
    fn id(&self) -> &str;

    /// Name requested at creation time.
    fn name(&self) -> &str;

    /// Image reference the container was created from.
    fn image(&self) -> &str;

    /// Environment variables requested at creation time.
    fn env_vars(&self) -> &EnvVars;

    /// Port mappings requested at creation time.
    fn ports(&self) -> &PortMappings;

    /// Start the container with default options.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::StartFailed` when the engine refuses.
    fn start(&self) -> OperationFuture<'_, ()>;

    /// Stop the container, allowing [`STOP_GRACE_PERIOD_SECS`] before it is
    /// killed.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::StopFailed` when the engine refuses.
    fn stop(&self) -> OperationFuture<'_, ()>;

    /// Remove the container.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::RemoveFailed` when the engine refuses,
    /// including when the container no longer exists.
    fn remove(&self) -> OperationFuture<'_, ()>;
}

/// A container created through [`crate::engine::Engine`].
///
/// The handle shares the engine connection with the facade that created it.
/// Its fields are a snapshot and may drift from the engine's live state.
pub struct Container<A: EngineApi = Docker> {
    id: String,
    name: String,
    image: String,
    ports: PortMappings,
    env_vars: EnvVars,
    api: Arc<A>,
}

impl<A: EngineApi> Container<A> {
    pub(crate) const fn new(
        id: String,
        name: String,
        image: String,
        ports: PortMappings,
        env_vars: EnvVars,
        api: Arc<A>,
    ) -> Self {
        Self {
            id,
            name,
            image,
            ports,
            env_vars,
            api,
        }
    }
}

impl<A: EngineApi> fmt::Debug for Container<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("image", &self.image)
            .field("ports", &self.ports)
            .field("env_vars", &self.env_vars)
            .finish_non_exhaustive()
    }
}

impl<A: EngineApi> ContainerHandle for Container<A> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn env_vars(&self) -> &EnvVars {
        &self.env_vars
    }

    fn ports(&self) -> &PortMappings {
        &self.ports
    }

    fn start(&self) -> OperationFuture<'_, ()> {
        Box::pin(start_by_id(self.api.as_ref(), &self.id))
    }

    fn stop(&self) -> OperationFuture<'_, ()> {
        Box::pin(stop_by_id(self.api.as_ref(), &self.id))
    }

    fn remove(&self) -> OperationFuture<'_, ()> {
        Box::pin(remove_by_id(self.api.as_ref(), &self.id))
    }
}

async fn start_by_id<A: EngineApi + ?Sized>(api: &A, container_id: &str) -> WrapperResult<()> {
    tracing::debug!(container_id, "starting container");
    api.start_container(container_id)
        .await
        .map_err(|source| ContainerError::StartFailed {
            container_id: String::from(container_id),
            source,
        })?;
    Ok(())
}

async fn stop_by_id<A: EngineApi + ?Sized>(api: &A, container_id: &str) -> WrapperResult<()> {
    tracing::debug!(container_id, "stopping container");
    api.stop_container(container_id, stop_options())
        .await
        .map_err(|source| ContainerError::StopFailed {
            container_id: String::from(container_id),
            source,
        })?;
    Ok(())
}

/// Remove a container using the crate-wide removal policy.
///
/// Removal is forced so running containers are killed first; anonymous
/// volumes and links are left in place. The facade and the handle share this
/// policy.
pub(crate) async fn remove_by_id<A: EngineApi + ?Sized>(
    api: &A,
    container_id: &str,
) -> WrapperResult<()> {
    api.remove_container(container_id, removal_options())
        .await
        .map_err(|source| ContainerError::RemoveFailed {
            container_id: String::from(container_id),
            source,
        })?;

    tracing::info!(container_id, "container removed");
    Ok(())
}

fn removal_options() -> RemoveContainerOptions {
    RemoveContainerOptionsBuilder::new()
        .force(true)
        .v(false)
        .link(false)
        .build()
}

fn stop_options() -> StopContainerOptions {
    StopContainerOptionsBuilder::new()
        .t(STOP_GRACE_PERIOD_SECS)
        .build()
}
