//! Caller-driven cancellation of engine requests.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{ContainerError, Result as WrapperResult};

/// Drive `request` to completion unless `cancel` fires first.
///
/// A token that is already cancelled wins without polling the request. The
/// abandoned request future is dropped, which aborts it inside the engine
/// client.
pub(crate) async fn run_cancellable<F, T>(
    cancel: &CancellationToken,
    operation: &'static str,
    request: F,
) -> WrapperResult<T>
where
    F: Future<Output = WrapperResult<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!(operation, "engine request cancelled");
            Err(ContainerError::Cancelled { operation }.into())
        }
        result = request => result,
    }
}
