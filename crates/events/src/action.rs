//! Action envelope and the dispatcher contract.

use serde::Serialize;

/// Logical operation an [`Action`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Persist script, create preview schedule, resolve its routine.
    PreviewSubmission,
    /// Repeated status fetches of a preview routine.
    PreviewPolling,
    SaveScript,
    SaveSchedule,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::PreviewSubmission => "preview_submission",
            ActionKind::PreviewPolling => "preview_polling",
            ActionKind::SaveScript => "save_script",
            ActionKind::SaveSchedule => "save_schedule",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state transition observed by downstream application state.
///
/// For a given logical operation, consumers see exactly one `Started`
/// followed by at most one terminal `Succeeded` or `Failed`. `Progress`
/// may appear any number of times in between.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Started {
        kind: ActionKind,
    },
    Progress {
        kind: ActionKind,
        payload: serde_json::Value,
    },
    Succeeded {
        kind: ActionKind,
        payload: serde_json::Value,
    },
    Failed {
        kind: ActionKind,
        message: String,
    },
    /// The server rejected the session token (HTTP 401).
    Unauthenticated,
}

impl Action {
    /// Operation kind, or `None` for the session-level signal.
    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            Action::Started { kind }
            | Action::Progress { kind, .. }
            | Action::Succeeded { kind, .. }
            | Action::Failed { kind, .. } => Some(*kind),
            Action::Unauthenticated => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Succeeded { .. } | Action::Failed { .. })
    }
}

/// Sink for pipeline notifications.
///
/// Implementors only provide [`dispatch`](Self::dispatch); the helpers
/// build the matching [`Action`].
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, action: Action);

    fn started(&self, kind: ActionKind) {
        self.dispatch(Action::Started { kind });
    }

    fn progress(&self, kind: ActionKind, payload: serde_json::Value) {
        self.dispatch(Action::Progress { kind, payload });
    }

    fn succeeded(&self, kind: ActionKind, payload: serde_json::Value) {
        self.dispatch(Action::Succeeded { kind, payload });
    }

    fn failed(&self, kind: ActionKind, message: String) {
        self.dispatch(Action::Failed { kind, message });
    }

    fn unauthenticated(&self) {
        self.dispatch(Action::Unauthenticated);
    }
}
