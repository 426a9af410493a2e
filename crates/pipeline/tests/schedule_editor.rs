mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use reqwest::Method;
use serde_json::json;

use typefast_core::{QueueName, Schedule, Script};
use typefast_events::{Action, ActionKind};
use typefast_pipeline::{PreviewError, ScheduleEditor};

use common::*;

fn editor(h: &Harness) -> ScheduleEditor<Arc<ScriptedTransport>> {
    ScheduleEditor::new(Arc::clone(&h.api), Arc::clone(&h.dispatcher))
}

#[tokio::test]
async fn save_script_reports_saved_script() {
    let transport = ScriptedTransport::new();
    transport.respond(Method::POST, "/scripts", 200, r#"{"id":"s1","code":"x","title":"t"}"#);
    let mut h = Harness::new(transport);

    let saved = editor(&h)
        .save_script(&Script::new("x").with_title("t"))
        .await
        .unwrap();
    assert_eq!(saved.id.as_deref(), Some("s1"));

    let form = h.transport.calls()[0].form.clone().unwrap();
    assert_eq!(form.get("code"), Some("x"));
    assert_eq!(form.get("title"), Some("t"));

    let actions = h.drain();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0], Action::Started { kind: ActionKind::SaveScript });
    assert_matches!(
        &actions[1],
        Action::Succeeded { kind: ActionKind::SaveScript, payload }
            if payload["script"]["id"] == json!("s1")
    );
}

#[tokio::test]
async fn save_schedule_saves_script_first_on_main_queue() {
    let transport = ScriptedTransport::new();
    transport
        .respond(Method::POST, "/scripts/s1", 200, r#"{"id":"s1","code":"x"}"#)
        .respond(
            Method::POST,
            "/schedules/sch1",
            200,
            r#"{"id":"sch1","script_id":"s1","queue_name":"main","recurrence":"0 * * * *"}"#,
        );
    let mut h = Harness::new(transport);

    let mut schedule = Schedule::preview("stale").with_recurrence("0 * * * *");
    schedule.id = Some("sch1".into());

    let saved = editor(&h)
        .save_schedule(&Script::new("x").with_id("s1"), &schedule)
        .await
        .unwrap();
    assert_eq!(saved.id.as_deref(), Some("sch1"));

    let calls = h.transport.calls();
    assert_eq!(calls[0].path, "/scripts/s1");
    assert_eq!(calls[1].path, "/schedules/sch1");
    let form = calls[1].form.as_ref().unwrap();
    assert_eq!(form.get("queue_name"), Some(QueueName::Main.as_str()));
    assert_eq!(form.get("script_id"), Some("s1"));
    assert_eq!(form.get("recurrence"), Some("0 * * * *"));
    assert_eq!(form.get("is_paused"), None);

    let kinds: Vec<_> = h
        .drain()
        .into_iter()
        .map(|a| (a.kind(), a.is_terminal()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (Some(ActionKind::SaveScript), false),
            (Some(ActionKind::SaveScript), true),
            (Some(ActionKind::SaveSchedule), false),
            (Some(ActionKind::SaveSchedule), true),
        ]
    );
}

#[tokio::test]
async fn failed_script_save_never_starts_schedule() {
    let transport = ScriptedTransport::new();
    transport.respond(Method::POST, "/scripts/s1", 500, "");
    let mut h = Harness::new(transport);

    let err = editor(&h)
        .save_schedule(&Script::new("x").with_id("s1"), &Schedule::main("s1"))
        .await
        .unwrap_err();

    assert_matches!(err, PreviewError::PersistenceFailed(_));
    assert_eq!(h.transport.calls().len(), 1);

    let actions = h.drain();
    assert!(of_kind(&actions, ActionKind::SaveSchedule).is_empty());
    assert_eq!(
        actions.last(),
        Some(&Action::Failed {
            kind: ActionKind::SaveScript,
            message: "Failed to save script: Internal Server Error".into(),
        })
    );
}

#[tokio::test]
async fn unauthenticated_schedule_save() {
    let transport = ScriptedTransport::new();
    transport
        .respond(Method::POST, "/scripts/s1", 200, r#"{"id":"s1"}"#)
        .respond(Method::POST, "/schedules", 401, "");
    let mut h = Harness::new(transport);

    let err = editor(&h)
        .save_schedule(&Script::new("x").with_id("s1"), &Schedule::main("s1"))
        .await
        .unwrap_err();

    assert!(err.is_unauthenticated());
    let actions = h.drain();
    assert_eq!(unauthenticated_count(&actions), 1);
    assert_eq!(terminal_count(&actions, ActionKind::SaveSchedule), 1);
}
