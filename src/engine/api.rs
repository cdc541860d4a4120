//! Engine client seam.
//!
//! [`EngineApi`] lists the handful of engine calls the wrapper relies on. The
//! production implementation delegates to `bollard::Docker`; tests substitute
//! `mockall` doubles so facade and handle behaviour can be exercised without a
//! running daemon.

use std::future::Future;
use std::pin::Pin;

use bollard::Docker;
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerCreateBody, ContainerCreateResponse, CreateImageInfo};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, RemoveContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use futures_util::Stream;

/// Boxed future type returned by [`EngineApi`] request methods.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BollardError>> + Send + 'a>>;

/// Boxed progress stream returned by [`EngineApi::create_image`].
pub type PullProgressStream<'a> =
    Pin<Box<dyn Stream<Item = Result<CreateImageInfo, BollardError>> + Send + 'a>>;

/// Behaviour required from the backing engine client.
///
/// Implementors must be safe to share between the facade and every container
/// handle it creates; requests are issued concurrently without extra locking.
pub trait EngineApi: Send + Sync {
    /// Check that the engine answers requests.
    fn ping(&self) -> EngineFuture<'_, ()>;

    /// Start an image pull and return its progress stream.
    fn create_image(&self, options: CreateImageOptions) -> PullProgressStream<'_>;

    /// Create a container from `Bollard` options and body payload.
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> EngineFuture<'_, ContainerCreateResponse>;

    /// Start a created container with default options.
    fn start_container(&self, container_id: &str) -> EngineFuture<'_, ()>;

    /// Stop a running container.
    fn stop_container(
        &self,
        container_id: &str,
        options: StopContainerOptions,
    ) -> EngineFuture<'_, ()>;

    /// Remove a container.
    fn remove_container(
        &self,
        container_id: &str,
        options: RemoveContainerOptions,
    ) -> EngineFuture<'_, ()>;
}

impl EngineApi for Docker {
    fn ping(&self) -> EngineFuture<'_, ()> {
        Box::pin(async move { Self::ping(self).await.map(|_| ()) })
    }

    fn create_image(&self, options: CreateImageOptions) -> PullProgressStream<'_> {
        Box::pin(Self::create_image(self, Some(options), None, None))
    }

    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> EngineFuture<'_, ContainerCreateResponse> {
        Box::pin(async move { Self::create_container(self, options, config).await })
    }

    fn start_container(&self, container_id: &str) -> EngineFuture<'_, ()> {
        let container_id_owned = String::from(container_id);
        Box::pin(async move {
            Self::start_container(self, &container_id_owned, None::<StartContainerOptions>).await
        })
    }

    fn stop_container(
        &self,
        container_id: &str,
        options: StopContainerOptions,
    ) -> EngineFuture<'_, ()> {
        let container_id_owned = String::from(container_id);
        Box::pin(async move { Self::stop_container(self, &container_id_owned, Some(options)).await })
    }

    fn remove_container(
        &self,
        container_id: &str,
        options: RemoveContainerOptions,
    ) -> EngineFuture<'_, ()> {
        let container_id_owned = String::from(container_id);
        Box::pin(async move {
            Self::remove_container(self, &container_id_owned, Some(options)).await
        })
    }
}
