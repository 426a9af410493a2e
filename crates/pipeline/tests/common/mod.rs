#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use typefast_client::{
    ApiError, ApiRequest, ApiResponse, FormBody, RequestBuilder, RoutineApi, Session, Transport,
};
use typefast_events::{Action, ActionBus, ActionDispatcher, ActionKind};

pub const BASE_URL: &str = "http://runner.test/";
pub const TOKEN: &str = "tok";

/// One request observed by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Option<FormBody>,
    pub at: Instant,
}

/// In-memory transport replaying canned responses per `(method, path)`.
///
/// Unscripted routes answer 404. Overlapping calls panic, so any test
/// driving it also asserts that requests are issued one at a time.
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicBool,
    latency: Duration,
    watched: Mutex<Option<CancellationToken>>,
    after_cancel: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
            latency,
            watched: Mutex::new(None),
            after_cancel: AtomicUsize::new(0),
        }
    }

    /// Queue one response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        let response = ApiResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body.to_string(),
        );
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// Queue a routine status response for `GET /routines/{id}`.
    pub fn routine_status(&self, routine_id: &str, log: &str, is_completed: bool) -> &Self {
        let body = serde_json::json!({ "runner_log": log, "is_completed": is_completed });
        self.respond(
            Method::GET,
            &format!("/routines/{routine_id}"),
            200,
            &body.to_string(),
        )
    }

    /// Count requests issued while `token` is already cancelled.
    pub fn watch_cancellation(&self, token: CancellationToken) {
        *self.watched.lock().unwrap() = Some(token);
    }

    pub fn calls_after_cancel(&self) -> usize {
        self.after_cancel.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        assert!(
            !self.in_flight.swap(true, Ordering::SeqCst),
            "overlapping request to {}",
            request.url.path()
        );

        if self
            .watched
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            self.after_cancel.fetch_add(1, Ordering::SeqCst);
        }

        let path = request.url.path().to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method.clone(),
            path: path.clone(),
            query: request
                .url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            form: request.form.clone(),
            at: Instant::now(),
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let response = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&(request.method, path))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| ApiResponse::new(StatusCode::NOT_FOUND, ""));

        self.in_flight.store(false, Ordering::SeqCst);
        Ok(response)
    }
}

/// Wiring shared by the pipeline tests.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub api: Arc<RoutineApi<Arc<ScriptedTransport>>>,
    pub dispatcher: Arc<dyn ActionDispatcher>,
    pub actions: broadcast::Receiver<Action>,
}

impl Harness {
    pub fn new(transport: ScriptedTransport) -> Self {
        let transport = Arc::new(transport);
        let bus = ActionBus::default();
        let actions = bus.subscribe();
        let dispatcher: Arc<dyn ActionDispatcher> = Arc::new(bus);

        let builder = RequestBuilder::new(Url::parse(BASE_URL).unwrap(), Session::new(TOKEN));
        let api = Arc::new(RoutineApi::new(
            Arc::clone(&transport),
            builder,
            Arc::clone(&dispatcher),
        ));

        Self {
            transport,
            api,
            dispatcher,
            actions,
        }
    }

    /// Every action dispatched since the last drain.
    pub fn drain(&mut self) -> Vec<Action> {
        let mut out = Vec::new();
        while let Ok(action) = self.actions.try_recv() {
            out.push(action);
        }
        out
    }
}

pub fn of_kind(actions: &[Action], kind: ActionKind) -> Vec<Action> {
    actions
        .iter()
        .filter(|a| a.kind() == Some(kind))
        .cloned()
        .collect()
}

pub fn progress_count(actions: &[Action], kind: ActionKind) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, Action::Progress { kind: k, .. } if *k == kind))
        .count()
}

pub fn terminal_count(actions: &[Action], kind: ActionKind) -> usize {
    of_kind(actions, kind)
        .iter()
        .filter(|a| a.is_terminal())
        .count()
}

pub fn unauthenticated_count(actions: &[Action]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, Action::Unauthenticated))
        .count()
}
