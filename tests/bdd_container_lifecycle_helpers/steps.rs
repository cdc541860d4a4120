//! Given/when step definitions for container lifecycle scenarios.

use std::future::Future;
use std::sync::{Arc, MutexGuard};

use container_wrapper::engine::{
    Container, ContainerEngine, ContainerHandle, ContainerPort, CreateContainerInput, Engine,
    HostBinding,
};
use container_wrapper::error::{ContainerError, WrapperError};
use rstest_bdd_macros::{given, when};
use tokio_util::sync::CancellationToken;

use super::fake_engine::{FakeRegistry, MockApi};
use super::state::{ContainerLifecycleState, FailureKind, OperationOutcome, StepResult};

#[given("the engine has image {image}")]
fn engine_has_image(
    container_lifecycle_state: &ContainerLifecycleState,
    image: String,
) -> StepResult<()> {
    registry(container_lifecycle_state, |state| state.add_image(image))
}

#[given("the engine will assign identifier {id}")]
fn engine_will_assign_identifier(
    container_lifecycle_state: &ContainerLifecycleState,
    id: String,
) -> StepResult<()> {
    registry(container_lifecycle_state, |state| state.assign_next_id(id))
}

#[given("the environment variable {key} is set to {value}")]
fn environment_variable_is_set(
    container_lifecycle_state: &ContainerLifecycleState,
    key: String,
    value: String,
) {
    let env = container_lifecycle_state
        .pending_env
        .get()
        .unwrap_or_default()
        .with(key, value);
    container_lifecycle_state.pending_env.set(env);
}

#[given("container port {port} is published on host port {host_port}")]
fn container_port_is_published(
    container_lifecycle_state: &ContainerLifecycleState,
    port: String,
    host_port: u16,
) -> StepResult<()> {
    let container_port = port
        .parse::<ContainerPort>()
        .map_err(|error| format!("invalid container port {port}: {error}"))?;
    let ports = container_lifecycle_state
        .pending_ports
        .get()
        .unwrap_or_default()
        .bind(container_port, HostBinding::port(host_port));
    container_lifecycle_state.pending_ports.set(ports);
    Ok(())
}

#[given("the caller has cancelled the request")]
fn caller_has_cancelled(container_lifecycle_state: &ContainerLifecycleState) {
    container_lifecycle_state.cancelled.set(true);
}

#[given("container {name} was created from {image}")]
fn container_was_created(
    container_lifecycle_state: &ContainerLifecycleState,
    name: String,
    image: String,
) -> StepResult<()> {
    create_container(container_lifecycle_state, name, image)?;
    match container_lifecycle_state.outcome.get() {
        Some(OperationOutcome::Succeeded) => Ok(()),
        other => Err(format!("setup create should succeed, got {other:?}")),
    }
}

#[when("image {image} is pulled")]
fn image_is_pulled(
    container_lifecycle_state: &ContainerLifecycleState,
    image: String,
) -> StepResult<()> {
    let engine = engine(container_lifecycle_state)?;
    let cancel = cancel_token(container_lifecycle_state);
    let result = block_on(engine.pull(&cancel, &image))?;
    record(container_lifecycle_state, result);
    Ok(())
}

#[when("container {name} is created from {image}")]
fn container_is_created(
    container_lifecycle_state: &ContainerLifecycleState,
    name: String,
    image: String,
) -> StepResult<()> {
    create_container(container_lifecycle_state, name, image)
}

fn create_container(
    container_lifecycle_state: &ContainerLifecycleState,
    name: String,
    image: String,
) -> StepResult<()> {
    let engine = engine(container_lifecycle_state)?;
    let cancel = cancel_token(container_lifecycle_state);
    let input = CreateContainerInput::new(name, image)
        .with_env_vars(container_lifecycle_state.pending_env.get().unwrap_or_default())
        .with_ports(
            container_lifecycle_state
                .pending_ports
                .get()
                .unwrap_or_default(),
        );

    let result = block_on(engine.create(&cancel, input))?;
    container_lifecycle_state
        .handle_returned
        .set(result.is_ok());
    let outcome = result.map(|handle| {
        container_lifecycle_state.handle.set(Arc::new(handle));
    });
    record(container_lifecycle_state, outcome);
    Ok(())
}

#[when("the handle starts the container")]
fn handle_starts_container(container_lifecycle_state: &ContainerLifecycleState) -> StepResult<()> {
    let handle = handle(container_lifecycle_state)?;
    let result = block_on(handle.start())?;
    record(container_lifecycle_state, result);
    Ok(())
}

#[when("the handle stops the container")]
fn handle_stops_container(container_lifecycle_state: &ContainerLifecycleState) -> StepResult<()> {
    let handle = handle(container_lifecycle_state)?;
    let result = block_on(handle.stop())?;
    record(container_lifecycle_state, result);
    Ok(())
}

#[when("the handle removes the container")]
fn handle_removes_container(
    container_lifecycle_state: &ContainerLifecycleState,
) -> StepResult<()> {
    let handle = handle(container_lifecycle_state)?;
    let result = block_on(handle.remove())?;
    record(container_lifecycle_state, result);
    Ok(())
}

#[when("the engine removes container {id}")]
fn engine_removes_container(
    container_lifecycle_state: &ContainerLifecycleState,
    id: String,
) -> StepResult<()> {
    let engine = engine(container_lifecycle_state)?;
    let cancel = cancel_token(container_lifecycle_state);
    let result = block_on(engine.remove(&cancel, &id))?;
    record(container_lifecycle_state, result);
    Ok(())
}

/// Run `action` against the fake engine's registry.
pub(crate) fn registry<T>(
    container_lifecycle_state: &ContainerLifecycleState,
    action: impl FnOnce(&mut FakeRegistry) -> T,
) -> StepResult<T> {
    let shared = container_lifecycle_state
        .registry
        .get()
        .ok_or_else(|| String::from("fake engine registry should be set"))?;
    let mut guard: MutexGuard<'_, FakeRegistry> = shared
        .lock()
        .map_err(|_| String::from("fake engine registry lock is poisoned"))?;
    Ok(action(&mut guard))
}

fn engine(container_lifecycle_state: &ContainerLifecycleState) -> StepResult<Engine<MockApi>> {
    container_lifecycle_state
        .engine
        .get()
        .ok_or_else(|| String::from("engine facade should be set"))
}

/// Return the handle from the most recent successful create.
pub(crate) fn handle(
    container_lifecycle_state: &ContainerLifecycleState,
) -> StepResult<Arc<Container<MockApi>>> {
    container_lifecycle_state
        .handle
        .get()
        .ok_or_else(|| String::from("a container handle should have been created"))
}

fn cancel_token(container_lifecycle_state: &ContainerLifecycleState) -> CancellationToken {
    let cancel = CancellationToken::new();
    if container_lifecycle_state.cancelled.get().unwrap_or(false) {
        cancel.cancel();
    }
    cancel
}

fn block_on<F: Future>(future: F) -> StepResult<F::Output> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|error| format!("failed to create tokio runtime for scenario: {error}"))?;
    Ok(runtime.block_on(future))
}

fn record(container_lifecycle_state: &ContainerLifecycleState, result: Result<(), WrapperError>) {
    let outcome = match result {
        Ok(()) => OperationOutcome::Succeeded,
        Err(error) => {
            let container_error = error.as_container();
            OperationOutcome::Failed {
                kind: container_error.map_or(FailureKind::Other, classify),
                not_found: container_error.is_some_and(ContainerError::is_not_found),
                conflict: container_error.is_some_and(ContainerError::is_conflict),
                message: error.to_string(),
            }
        }
    };
    container_lifecycle_state.outcome.set(outcome);
}

const fn classify(error: &ContainerError) -> FailureKind {
    match error {
        ContainerError::PullFailed { .. } => FailureKind::PullFailed,
        ContainerError::CreateFailed { .. } => FailureKind::CreateFailed,
        ContainerError::StartFailed { .. } => FailureKind::StartFailed,
        ContainerError::StopFailed { .. } => FailureKind::StopFailed,
        ContainerError::RemoveFailed { .. } => FailureKind::RemoveFailed,
        ContainerError::Cancelled { .. } => FailureKind::Cancelled,
        _ => FailureKind::Other,
    }
}
