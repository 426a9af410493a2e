//! End-to-end preview: submit, then poll until the routine completes.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use typefast_client::{RoutineApi, Transport};
use typefast_core::Script;
use typefast_events::ActionDispatcher;

use crate::error::PreviewError;
use crate::poller::{PollOutcome, RoutinePoller};
use crate::submitter::{PreviewSubmitter, SubmittedPreview};

/// Result of a preview run that was not aborted by an error.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOutcome {
    pub submission: SubmittedPreview,
    pub poll: PollOutcome,
}

/// Chains [`PreviewSubmitter`] and [`RoutinePoller`] for one script.
pub struct PreviewPipeline<T> {
    submitter: PreviewSubmitter<T>,
    poller: RoutinePoller<T>,
}

impl<T: Transport + 'static> PreviewPipeline<T> {
    /// Pipeline polling at [`DEFAULT_POLL_INTERVAL`](crate::DEFAULT_POLL_INTERVAL).
    pub fn new(api: Arc<RoutineApi<T>>, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self {
            submitter: PreviewSubmitter::new(Arc::clone(&api), Arc::clone(&dispatcher)),
            poller: RoutinePoller::new(api, dispatcher),
        }
    }

    /// Override the delay between status fetches.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = self.poller.with_interval(interval);
        self
    }

    /// Submit `script` as a preview and poll its routine to completion.
    ///
    /// Polling starts only after submission succeeded. A submission
    /// failure is returned without any polling notifications.
    pub async fn run(
        &self,
        script: &Script,
        cancel: &CancellationToken,
    ) -> Result<PreviewOutcome, PreviewError> {
        let submission = self.submitter.submit_preview(script).await?;
        let poll = self
            .poller
            .poll_until_complete(&submission.routine_id, cancel)
            .await?;

        Ok(PreviewOutcome { submission, poll })
    }

    /// Run the preview on a background task.
    ///
    /// Dropping the returned handle stops the polling loop.
    pub fn spawn(self: Arc<Self>, script: Script) -> PreviewHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move { self.run(&script, &token).await });

        PreviewHandle {
            cancel: cancel.clone(),
            _guard: cancel.drop_guard(),
            task,
        }
    }
}

/// Owner of a background preview run.
pub struct PreviewHandle {
    cancel: CancellationToken,
    _guard: DropGuard,
    task: JoinHandle<Result<PreviewOutcome, PreviewError>>,
}

impl PreviewHandle {
    /// Stop polling. Idempotent; no further notifications are emitted
    /// for the polling operation.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token cancelled by [`stop`](Self::stop) or by dropping the handle.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the background task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to end.
    pub async fn join(self) -> Result<PreviewOutcome, PreviewError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(PreviewError::TaskAborted(e.to_string())),
        }
    }
}
