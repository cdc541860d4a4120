//! Engine health check.
//!
//! A ping bounded by a timeout confirms the engine is operational, not just
//! that its endpoint could be parsed.

use std::time::Duration;

use super::EngineConnector;
use crate::engine::api::EngineApi;
use crate::error::{ContainerError, Result as WrapperResult};

impl EngineConnector {
    /// Verify the container engine is responsive.
    ///
    /// Sends a ping and waits up to `timeout_secs` for the answer.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::HealthCheckFailed` if the engine does not
    /// respond correctly.
    ///
    /// Returns `ContainerError::HealthCheckTimeout` if the check times out.
    pub async fn health_check_async<A: EngineApi + ?Sized>(
        api: &A,
        timeout_secs: u64,
    ) -> WrapperResult<()> {
        let timeout = Duration::from_secs(timeout_secs);

        tokio::time::timeout(timeout, api.ping())
            .await
            .map_err(|_| ContainerError::HealthCheckTimeout {
                seconds: timeout_secs,
            })?
            .map_err(|error| ContainerError::HealthCheckFailed {
                message: error.to_string(),
            })?;
        Ok(())
    }
}
