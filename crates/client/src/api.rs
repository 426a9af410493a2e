//! Typed endpoints of the routine runner API.
//!
//! Every call funnels through [`RoutineApi::execute`], which runs the
//! transport, classifies the response and raises the session-level
//! [`Action::Unauthenticated`](typefast_events::Action) signal on 401.

use std::sync::Arc;

use typefast_core::{QueueName, RoutineList, RoutineStatus, Schedule, Script};
use typefast_events::ActionDispatcher;

use crate::error::ApiError;
use crate::request::{ApiRequest, Params, RequestBuilder};
use crate::response::{ensure_success, ApiResponse};
use crate::transport::Transport;

/// HTTP client for the scripts, schedules and routines resources.
pub struct RoutineApi<T> {
    transport: T,
    builder: RequestBuilder,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl<T: Transport> RoutineApi<T> {
    /// Create a client sending requests built by `builder` through
    /// `transport`. Session-level signals go to `dispatcher`.
    pub fn new(
        transport: T,
        builder: RequestBuilder,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Self {
        Self {
            transport,
            builder,
            dispatcher,
        }
    }

    /// Execute a request and classify its response.
    ///
    /// On 401 the dispatcher receives `Unauthenticated` before the error
    /// is returned; the caller still sees the failure.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method.clone();
        let path = request.url.path().to_string();

        let response = self.transport.execute(request).await?;

        match ensure_success(response) {
            Ok(response) => {
                tracing::debug!(
                    %method,
                    path = %path,
                    status = response.status.as_u16(),
                    "Request succeeded",
                );
                Ok(response)
            }
            Err(ApiError::Unauthenticated) => {
                tracing::warn!(%method, path = %path, "Session token rejected");
                self.dispatcher.unauthenticated();
                Err(ApiError::Unauthenticated)
            }
            Err(e) => {
                tracing::warn!(%method, path = %path, error = %e, "Request failed");
                Err(e)
            }
        }
    }

    /// Create or update a script (`POST /scripts/{id?}`).
    pub async fn save_script(&self, script: &Script) -> Result<Script, ApiError> {
        let url = self.builder.endpoint(&resource("scripts", script.id.as_deref()))?;
        let body = Params::new()
            .with("code", script.code.as_str())
            .with("optimisations", script.optimisations.clone())
            .with("title", script.title.as_str());
        let form = self.builder.form(&body);

        self.execute(ApiRequest::post(url, form)).await?.json()
    }

    /// Create or update a schedule (`POST /schedules/{id?}`).
    pub async fn save_schedule(&self, schedule: &Schedule) -> Result<Schedule, ApiError> {
        let url = self.builder.endpoint(&resource("schedules", schedule.id.as_deref()))?;
        let body = Params::new()
            .with("queue_name", schedule.queue_name.as_str())
            .with("script_id", schedule.script_id.as_str())
            // The runner reads any present `is_paused` as true.
            .with("is_paused", schedule.is_paused.then_some(true))
            .with("recurrence", schedule.recurrence.clone())
            .with("start_time", schedule.start_time.map(|t| t.to_rfc3339()));
        let form = self.builder.form(&body);

        self.execute(ApiRequest::post(url, form)).await?.json()
    }

    /// List routines of one schedule on one queue (`GET /routines`).
    pub async fn list_routines(
        &self,
        queue: QueueName,
        schedule_id: &str,
    ) -> Result<RoutineList, ApiError> {
        let query = Params::new()
            .with("queue_name", queue.as_str())
            .with("schedule_id", schedule_id);
        let url = self.builder.url(&["routines"], &query)?;

        self.execute(ApiRequest::get(url)).await?.json()
    }

    /// Fetch the current log and completion flag of a routine.
    pub async fn get_routine(&self, routine_id: &str) -> Result<RoutineStatus, ApiError> {
        let url = self.builder.url(&["routines", routine_id], &Params::new())?;

        self.execute(ApiRequest::get(url)).await?.json()
    }
}

/// Path segments for a collection, optionally addressing one member.
fn resource<'a>(collection: &'a str, id: Option<&'a str>) -> Vec<&'a str> {
    match id {
        Some(id) if !id.is_empty() => vec![collection, id],
        _ => vec![collection],
    }
}
