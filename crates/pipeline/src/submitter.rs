//! Submission half of a preview: persist, schedule, resolve routine.

use std::sync::Arc;

use serde_json::json;
use typefast_client::{RoutineApi, Transport};
use typefast_core::{QueueName, Schedule, Script};
use typefast_events::{ActionDispatcher, ActionKind};

use crate::error::PreviewError;
use crate::operation::track;

/// Identifiers produced by a successful preview submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedPreview {
    /// The submitted script with its server-assigned id.
    pub script: Script,
    pub schedule_id: String,
    pub routine_id: String,
}

/// Runs the three sequential submission steps as one
/// [`ActionKind::PreviewSubmission`] operation.
pub struct PreviewSubmitter<T> {
    api: Arc<RoutineApi<T>>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl<T: Transport> PreviewSubmitter<T> {
    /// Submitter saving through `api` and reporting to `dispatcher`.
    pub fn new(api: Arc<RoutineApi<T>>, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self { api, dispatcher }
    }

    /// Persist `script`, create a preview schedule for it and return the
    /// routine that schedule spawned.
    ///
    /// Stops at the first failing step; later steps are not attempted.
    pub async fn submit_preview(&self, script: &Script) -> Result<SubmittedPreview, PreviewError> {
        track(
            self.dispatcher.as_ref(),
            ActionKind::PreviewSubmission,
            self.submit_steps(script),
            |submitted| {
                json!({
                    "script_id": submitted.script.id,
                    "schedule_id": submitted.schedule_id,
                    "routine_id": submitted.routine_id,
                })
            },
        )
        .await
    }

    async fn submit_steps(&self, script: &Script) -> Result<SubmittedPreview, PreviewError> {
        let saved = self
            .api
            .save_script(script)
            .await
            .map_err(PreviewError::PersistenceFailed)?;
        let script_id = non_empty(saved.id.as_deref())
            .or_else(|| non_empty(script.id.as_deref()))
            .ok_or(PreviewError::MissingId { entity: "script" })?
            .to_string();

        let schedule = self
            .api
            .save_schedule(&Schedule::preview(&script_id))
            .await
            .map_err(PreviewError::ScheduleCreationFailed)?;
        let schedule_id = non_empty(schedule.id.as_deref())
            .ok_or(PreviewError::MissingId { entity: "schedule" })?
            .to_string();

        let routines = self
            .api
            .list_routines(QueueName::Preview, &schedule_id)
            .await
            .map_err(PreviewError::RoutineLookupFailed)?;
        let routine = routines
            .data
            .into_iter()
            .next()
            .ok_or_else(|| PreviewError::NoRoutineProduced {
                schedule_id: schedule_id.clone(),
            })?;

        tracing::info!(
            script_id = %script_id,
            schedule_id = %schedule_id,
            routine_id = %routine.id,
            "Preview submitted"
        );

        Ok(SubmittedPreview {
            script: script.clone().with_id(script_id),
            schedule_id,
            routine_id: routine.id,
        })
    }
}

pub(crate) fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}
