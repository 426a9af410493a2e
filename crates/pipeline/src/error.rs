use typefast_client::ApiError;

/// Step-level failures of the preview and save workflows.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Creating or updating the script failed.
    #[error("Failed to save script: {0}")]
    PersistenceFailed(#[source] ApiError),

    /// Creating the schedule failed.
    #[error("Failed to create schedule: {0}")]
    ScheduleCreationFailed(#[source] ApiError),

    /// Listing the routines of a fresh preview schedule failed.
    #[error("Failed to look up routine: {0}")]
    RoutineLookupFailed(#[source] ApiError),

    /// The schedule was created but the runner reported no routine for it.
    #[error("Schedule {schedule_id} produced no routine")]
    NoRoutineProduced { schedule_id: String },

    /// A status fetch failed; polling stopped.
    #[error("Failed to poll routine {routine_id}: {source}")]
    PollingFailed {
        routine_id: String,
        #[source]
        source: ApiError,
    },

    /// The server accepted a write but returned no identifier.
    #[error("Server returned a {entity} without an id")]
    MissingId { entity: &'static str },

    /// The background preview task ended without producing a result.
    #[error("Preview task aborted: {0}")]
    TaskAborted(String),
}

impl PreviewError {
    /// Underlying API error, when the failure came from an HTTP call.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            PreviewError::PersistenceFailed(e)
            | PreviewError::ScheduleCreationFailed(e)
            | PreviewError::RoutineLookupFailed(e)
            | PreviewError::PollingFailed { source: e, .. } => Some(e),
            _ => None,
        }
    }

    /// Whether the step failed because the session token was rejected.
    pub fn is_unauthenticated(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_status_text() {
        let err = PreviewError::ScheduleCreationFailed(ApiError::RequestFailed {
            status: 500,
            status_text: "Internal Server Error".into(),
        });
        assert_eq!(err.to_string(), "Failed to create schedule: Internal Server Error");
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn unauthenticated_is_detected_through_wrapper() {
        let err = PreviewError::PollingFailed {
            routine_id: "r1".into(),
            source: ApiError::Unauthenticated,
        };
        assert!(err.is_unauthenticated());
        assert_eq!(err.to_string(), "Failed to poll routine r1: Unauthorized");
    }

    #[test]
    fn protocol_errors_have_no_api_error() {
        let err = PreviewError::NoRoutineProduced {
            schedule_id: "sch1".into(),
        };
        assert!(err.api_error().is_none());
        assert_eq!(err.to_string(), "Schedule sch1 produced no routine");
    }
}
