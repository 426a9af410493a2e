//! Status polling of a single routine.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use typefast_client::{RoutineApi, Transport};
use typefast_core::RoutineStatus;
use typefast_events::{ActionDispatcher, ActionKind};

use crate::error::PreviewError;

/// Delay between the end of one status fetch and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// How a polling loop ended without error.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The runner marked the routine completed. Carries the final status.
    Completed(RoutineStatus),
    /// The loop was stopped from outside before completion.
    Cancelled,
}

/// Repeatedly fetches a routine's status until it completes, fails or is
/// cancelled.
///
/// Fetches are strictly sequential: the next one is scheduled only after
/// the previous one has resolved, so responses are always handled in
/// order and at most one request per routine is in flight.
pub struct RoutinePoller<T> {
    api: Arc<RoutineApi<T>>,
    dispatcher: Arc<dyn ActionDispatcher>,
    interval: Duration,
}

impl<T: Transport> RoutinePoller<T> {
    /// Poller with the default one-second interval.
    pub fn new(api: Arc<RoutineApi<T>>, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self {
            api,
            dispatcher,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the delay between fetches.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Delay between the end of one fetch and the start of the next.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `routine_id` until the runner reports completion.
    ///
    /// Emits one [`ActionKind::PreviewPolling`] `started`, a `progress`
    /// with `{log, is_completed}` per successful fetch, then `succeeded`
    /// on completion or `failed` on the first fetch error. No fetch is
    /// retried.
    ///
    /// Cancelling `cancel` ends the loop with [`PollOutcome::Cancelled`]
    /// and no further notifications. A fetch already in flight when the
    /// token fires runs to completion but its result is discarded.
    pub async fn poll_until_complete(
        &self,
        routine_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, PreviewError> {
        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled);
        }

        let kind = ActionKind::PreviewPolling;
        self.dispatcher.started(kind);
        tracing::info!(
            routine_id = %routine_id,
            interval_ms = self.interval.as_millis() as u64,
            "Polling routine",
        );

        let mut fetches: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                tracing::info!(routine_id = %routine_id, fetches, "Polling cancelled");
                return Ok(PollOutcome::Cancelled);
            }

            let result = self.api.get_routine(routine_id).await;
            fetches += 1;

            if cancel.is_cancelled() {
                tracing::info!(routine_id = %routine_id, fetches, "Polling cancelled");
                return Ok(PollOutcome::Cancelled);
            }

            let status = match result {
                Ok(status) => status,
                Err(source) => {
                    let err = PreviewError::PollingFailed {
                        routine_id: routine_id.to_string(),
                        source,
                    };
                    tracing::error!(
                        routine_id = %routine_id,
                        fetches,
                        error = %err,
                        "Polling failed",
                    );
                    self.dispatcher.failed(kind, err.to_string());
                    return Err(err);
                }
            };

            let payload = json!({
                "log": status.runner_log,
                "is_completed": status.is_completed,
            });
            self.dispatcher.progress(kind, payload.clone());

            if status.is_completed {
                tracing::info!(routine_id = %routine_id, fetches, "Routine completed");
                self.dispatcher.succeeded(kind, payload);
                return Ok(PollOutcome::Completed(status));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(routine_id = %routine_id, fetches, "Polling cancelled");
                    return Ok(PollOutcome::Cancelled);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
