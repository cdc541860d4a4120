//! Behavioural step helpers for container lifecycle scenarios.

mod state;
mod steps;

pub use state::{ContainerLifecycleState, container_lifecycle_state};
