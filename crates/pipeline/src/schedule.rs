//! Saving scripts and their recurring schedules from the editor.

use std::sync::Arc;

use serde_json::json;
use typefast_client::{RoutineApi, Transport};
use typefast_core::{QueueName, Schedule, Script};
use typefast_events::{ActionDispatcher, ActionKind};

use crate::error::PreviewError;
use crate::operation::track;
use crate::submitter::non_empty;

/// Save flows of the script editor, each reported as its own operation.
pub struct ScheduleEditor<T> {
    api: Arc<RoutineApi<T>>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl<T: Transport> ScheduleEditor<T> {
    /// Editor saving through `api` and reporting to `dispatcher`.
    pub fn new(api: Arc<RoutineApi<T>>, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self { api, dispatcher }
    }

    /// Create or update `script` as one [`ActionKind::SaveScript`]
    /// operation. The success payload carries the saved script.
    pub async fn save_script(&self, script: &Script) -> Result<Script, PreviewError> {
        track(
            self.dispatcher.as_ref(),
            ActionKind::SaveScript,
            async {
                self.api
                    .save_script(script)
                    .await
                    .map_err(PreviewError::PersistenceFailed)
            },
            |saved| json!({ "script": saved }),
        )
        .await
    }

    /// Save `script`, then save `schedule` for it on the main queue.
    ///
    /// The schedule's `script_id` and queue are overwritten with the saved
    /// script's id and [`QueueName::Main`]. If saving the script fails the
    /// schedule operation is never started.
    pub async fn save_schedule(
        &self,
        script: &Script,
        schedule: &Schedule,
    ) -> Result<Schedule, PreviewError> {
        let saved_script = self.save_script(script).await?;

        track(
            self.dispatcher.as_ref(),
            ActionKind::SaveSchedule,
            async {
                let script_id = non_empty(saved_script.id.as_deref())
                    .or_else(|| non_empty(script.id.as_deref()))
                    .ok_or(PreviewError::MissingId { entity: "script" })?;

                let mut schedule = schedule.clone();
                schedule.script_id = script_id.to_string();
                schedule.queue_name = QueueName::Main;

                self.api
                    .save_schedule(&schedule)
                    .await
                    .map_err(PreviewError::ScheduleCreationFailed)
            },
            |saved| json!({ "schedule": saved }),
        )
        .await
    }
}
