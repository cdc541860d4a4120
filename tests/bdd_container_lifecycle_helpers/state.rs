//! Shared behavioural-test state for container lifecycle scenarios.

use std::sync::{Arc, Mutex};

use container_wrapper::engine::{Container, Engine, EnvVars, PortMappings};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::fake_engine::{FakeRegistry, MockApi, SharedRegistry, fake_api};

/// Step result type for lifecycle BDD tests.
pub type StepResult<T> = Result<T, String>;

/// Failure categories the scenarios assert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The engine rejected or failed a pull.
    PullFailed,
    /// The engine rejected a create request.
    CreateFailed,
    /// The engine refused to start the container.
    StartFailed,
    /// The engine refused to stop the container.
    StopFailed,
    /// The engine refused to remove the container.
    RemoveFailed,
    /// The caller cancelled the request.
    Cancelled,
    /// Any other failure.
    Other,
}

/// Outcome of the most recent facade or handle operation.
#[derive(Debug, Clone)]
pub enum OperationOutcome {
    /// The engine accepted the request.
    Succeeded,
    /// The request failed.
    Failed {
        /// Failure category.
        kind: FailureKind,
        /// Whether the engine answered 404.
        not_found: bool,
        /// Whether the engine answered 409.
        conflict: bool,
        /// Rendered error message.
        message: String,
    },
}

/// Shared scenario state for container lifecycle behavioural tests.
#[derive(Default, ScenarioState)]
pub struct ContainerLifecycleState {
    /// Fake engine backing the facade.
    pub(crate) registry: Slot<SharedRegistry>,

    /// Facade under test.
    pub(crate) engine: Slot<Engine<MockApi>>,

    /// Environment variables for the next create request.
    pub(crate) pending_env: Slot<EnvVars>,

    /// Port mappings for the next create request.
    pub(crate) pending_ports: Slot<PortMappings>,

    /// Whether requests are issued with an already cancelled token.
    pub(crate) cancelled: Slot<bool>,

    /// Handle returned by the most recent successful create.
    pub(crate) handle: Slot<Arc<Container<MockApi>>>,

    /// Whether the most recent create returned a handle.
    pub(crate) handle_returned: Slot<bool>,

    /// Outcome of the most recent operation.
    pub(crate) outcome: Slot<OperationOutcome>,
}

/// Fixture providing a fresh fake engine and facade for each scenario.
#[fixture]
pub fn container_lifecycle_state() -> ContainerLifecycleState {
    let registry: SharedRegistry = Arc::new(Mutex::new(FakeRegistry::default()));
    let state = ContainerLifecycleState::default();
    state.engine.set(Engine::with_api(fake_api(&registry)));
    state.registry.set(registry);
    state.pending_env.set(EnvVars::new());
    state.pending_ports.set(PortMappings::new());
    state.cancelled.set(false);
    state.handle_returned.set(false);
    state
}
