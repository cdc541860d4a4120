//! Collection-level engine operations.
//!
//! [`Engine`] is the single entry point for one engine connection. It pulls
//! images, creates containers (returning a [`Container`] handle wired to the
//! same connection) and removes containers by identifier. Every operation is
//! one engine request; nothing is retried or cached.

use std::fmt;
use std::sync::Arc;

use bollard::Docker;
use bollard::models::{ContainerCreateBody, CreateImageInfo, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptions, CreateContainerOptionsBuilder, CreateImageOptions,
    CreateImageOptionsBuilder,
};
use futures_util::StreamExt;
use mockable::DefaultEnv;
use tokio_util::sync::CancellationToken;

use super::api::EngineApi;
use super::cancel::run_cancellable;
use super::connection::{EngineConnector, SocketResolver};
use super::container::{Container, OperationFuture, remove_by_id};
use super::env_vars::EnvVars;
use super::ports::PortMappings;
use crate::config::EngineConfig;
use crate::error::{ContainerError, Result as WrapperResult};

/// Tag the engine CLI assumes when a reference names none.
const DEFAULT_TAG: &str = "latest";

/// Collection-level operations offered by a container engine.
///
/// Alternate backends and test doubles implement this trait to stand in for
/// the `bollard`-backed [`Engine`].
pub trait ContainerEngine: Send + Sync {
    /// Handle type returned by [`Self::create`].
    type Container: super::ContainerHandle;

    /// Pull an image, waiting until the engine reports the transfer finished.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::PullFailed` when the engine rejects the
    /// reference or the transfer fails, and `ContainerError::Cancelled` when
    /// `cancel` fires first.
    fn pull<'a>(&'a self, cancel: &'a CancellationToken, image: &'a str)
    -> OperationFuture<'a, ()>;

    /// Create a container and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::CreateFailed` when the engine rejects the
    /// request (for example a duplicate name or an unknown image), and
    /// `ContainerError::Cancelled` when `cancel` fires first.
    fn create<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        input: CreateContainerInput,
    ) -> OperationFuture<'a, Self::Container>;

    /// Remove the container with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::RemoveFailed` when the container does not
    /// exist or removal is refused, and `ContainerError::Cancelled` when
    /// `cancel` fires first.
    fn remove<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        container_id: &'a str,
    ) -> OperationFuture<'a, ()>;
}

/// Fields required to create a container.
///
/// Nothing is validated locally; the engine is the authority on names, image
/// references and port bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateContainerInput {
    name: String,
    image: String,
    ports: PortMappings,
    env_vars: EnvVars,
}

impl CreateContainerInput {
    /// Create an input with a container name and image reference.
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ports: PortMappings::new(),
            env_vars: EnvVars::new(),
        }
    }

    /// Attach port mappings.
    #[must_use]
    pub fn with_ports(mut self, ports: PortMappings) -> Self {
        self.ports = ports;
        self
    }

    /// Attach environment variables.
    #[must_use]
    pub fn with_env_vars(mut self, env_vars: EnvVars) -> Self {
        self.env_vars = env_vars;
        self
    }

    /// Return the requested container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the image reference.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Return the port mappings.
    #[must_use]
    pub const fn ports(&self) -> &PortMappings {
        &self.ports
    }

    /// Return the environment variables.
    #[must_use]
    pub const fn env_vars(&self) -> &EnvVars {
        &self.env_vars
    }
}

/// Facade over one container engine connection.
///
/// The connection is reference counted and shared with every [`Container`]
/// this facade creates, so handles stay usable after the facade is dropped.
pub struct Engine<A: EngineApi = Docker> {
    api: Arc<A>,
}

impl Engine<Docker> {
    /// Connect to the engine described by `config`.
    ///
    /// The endpoint is `config.engine_socket` when set, otherwise the first of
    /// `DOCKER_HOST`, `CONTAINER_HOST` and `PODMAN_HOST`, otherwise the
    /// platform default socket.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unusable configuration,
    /// `ContainerError::ConnectionFailed`, `SocketNotFound` or
    /// `PermissionDenied` when the endpoint cannot be used, and health-check
    /// errors when `verify_on_connect` is set and the engine does not answer.
    pub async fn connect(config: &EngineConfig) -> WrapperResult<Self> {
        Self::connect_with_env(config, &DefaultEnv::new()).await
    }

    /// Connect using an explicit environment provider for endpoint fallback.
    ///
    /// # Errors
    ///
    /// See [`Self::connect`].
    pub async fn connect_with_env<E: mockable::Env>(
        config: &EngineConfig,
        env: &E,
    ) -> WrapperResult<Self> {
        config.validate()?;

        let socket = {
            let resolver = SocketResolver::new(env);
            EngineConnector::resolve_socket(config.engine_socket.as_deref(), &resolver)
        };
        let docker = EngineConnector::connect(&socket, config.connect_timeout_secs)?;
        let engine = Self::with_api(docker);

        if config.verify_on_connect {
            EngineConnector::health_check_async(
                engine.api.as_ref(),
                config.health_check_timeout_secs,
            )
            .await?;
        }

        tracing::info!(socket = %socket, "connected to container engine");
        Ok(engine)
    }

    /// Connect with default settings, discovering the endpoint from the
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`Self::connect`].
    pub async fn from_env() -> WrapperResult<Self> {
        Self::connect(&EngineConfig::default()).await
    }
}

impl<A: EngineApi> Engine<A> {
    /// Wrap an existing engine client.
    #[must_use]
    pub fn with_api(api: A) -> Self {
        Self::from_shared(Arc::new(api))
    }

    /// Wrap an engine client that is already shared elsewhere.
    #[must_use]
    pub const fn from_shared(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Check that the engine answers within `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::HealthCheckFailed` or
    /// `ContainerError::HealthCheckTimeout`.
    pub async fn verify(&self, timeout_secs: u64) -> WrapperResult<()> {
        EngineConnector::health_check_async(self.api.as_ref(), timeout_secs).await
    }
}

impl<A: EngineApi> Clone for Engine<A> {
    fn clone(&self) -> Self {
        Self::from_shared(Arc::clone(&self.api))
    }
}

impl<A: EngineApi> fmt::Debug for Engine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl<A: EngineApi> ContainerEngine for Engine<A> {
    type Container = Container<A>;

    fn pull<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        image: &'a str,
    ) -> OperationFuture<'a, ()> {
        Box::pin(run_cancellable(
            cancel,
            "pull",
            pull_image(self.api.as_ref(), image),
        ))
    }

    fn create<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        input: CreateContainerInput,
    ) -> OperationFuture<'a, Self::Container> {
        Box::pin(run_cancellable(
            cancel,
            "create",
            create_container(&self.api, input),
        ))
    }

    fn remove<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        container_id: &'a str,
    ) -> OperationFuture<'a, ()> {
        Box::pin(run_cancellable(
            cancel,
            "remove",
            remove_by_id(self.api.as_ref(), container_id),
        ))
    }
}

async fn pull_image<A: EngineApi + ?Sized>(api: &A, image: &str) -> WrapperResult<()> {
    tracing::info!(image, "pulling image");

    let mut progress = api.create_image(build_pull_options(image));
    while let Some(entry) = progress.next().await {
        let info = entry.map_err(|source| ContainerError::PullFailed {
            image: String::from(image),
            source,
        })?;
        log_pull_progress(image, &info);
    }

    tracing::info!(image, "image pulled");
    Ok(())
}

async fn create_container<A: EngineApi>(
    api: &Arc<A>,
    input: CreateContainerInput,
) -> WrapperResult<Container<A>> {
    let response = api
        .create_container(build_create_options(input.name()), build_create_body(&input))
        .await
        .map_err(|source| ContainerError::CreateFailed {
            name: String::from(input.name()),
            source,
        })?;

    for warning in &response.warnings {
        tracing::warn!(container_id = %response.id, warning = %warning, "engine create warning");
    }
    tracing::info!(
        container_id = %response.id,
        name = input.name(),
        image = input.image(),
        "container created"
    );

    let CreateContainerInput {
        name,
        image,
        ports,
        env_vars,
    } = input;
    Ok(Container::new(
        response.id,
        name,
        image,
        ports,
        env_vars,
        Arc::clone(api),
    ))
}

fn log_pull_progress(image: &str, info: &CreateImageInfo) {
    tracing::debug!(
        image,
        layer = ?info.id,
        status = ?info.status,
        progress = ?info.progress_detail,
        error = ?info.error_detail,
        "pull progress"
    );
}

/// Split an image reference into the repository and tag the engine expects.
///
/// Digest references keep the digest as the tag and drop any tag written
/// before it. References without a tag default to [`DEFAULT_TAG`], otherwise
/// the engine would pull every tag of the repository.
fn split_image_reference(image: &str) -> (&str, &str) {
    if let Some((named, digest)) = image.split_once('@') {
        let (repository, _) = split_tag(named);
        return (repository, digest);
    }

    let (repository, tag) = split_tag(image);
    (repository, tag.unwrap_or(DEFAULT_TAG))
}

/// Separate a trailing `:tag`, ignoring the colon of a registry port.
fn split_tag(reference: &str) -> (&str, Option<&str>) {
    let name_start = reference.rfind('/').map_or(0, |index| index + 1);
    match reference.rfind(':') {
        Some(index) if index >= name_start => {
            let (repository, tag) = reference.split_at(index);
            (repository, Some(tag.trim_start_matches(':')))
        }
        _ => (reference, None),
    }
}

fn build_pull_options(image: &str) -> CreateImageOptions {
    let (repository, tag) = split_image_reference(image);
    CreateImageOptionsBuilder::new()
        .from_image(repository)
        .tag(tag)
        .build()
}

fn build_create_options(name: &str) -> Option<CreateContainerOptions> {
    Some(name)
        .filter(|value| !value.trim().is_empty())
        .map(|container_name| {
            CreateContainerOptionsBuilder::new()
                .name(container_name)
                .build()
        })
}

fn build_create_body(input: &CreateContainerInput) -> ContainerCreateBody {
    ContainerCreateBody {
        image: Some(String::from(input.image())),
        env: Some(input.env_vars().to_entries()),
        host_config: Some(HostConfig {
            port_bindings: Some(input.ports().to_port_map()),
            ..HostConfig::default()
        }),
        ..ContainerCreateBody::default()
    }
}
