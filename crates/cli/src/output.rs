//! Terminal rendering of preview progress.

use std::io::Write;

use tokio::sync::broadcast::{self, error::RecvError};
use typefast_events::{Action, ActionKind};

/// How a freshly fetched log relates to what is already on screen.
#[derive(Debug, PartialEq, Eq)]
enum LogUpdate<'a> {
    /// The new log extends the shown one; print only the tail.
    Append(&'a str),
    /// The runner rewrote earlier output; print the whole log again.
    Replace(&'a str),
}

fn log_update<'a>(shown: &str, log: &'a str) -> LogUpdate<'a> {
    match log.strip_prefix(shown) {
        Some(tail) => LogUpdate::Append(tail),
        None => LogUpdate::Replace(log),
    }
}

/// Print polling progress until the action bus closes.
pub async fn print_progress(mut rx: broadcast::Receiver<Action>) {
    let mut shown = String::new();
    let mut stdout = std::io::stdout();

    loop {
        match rx.recv().await {
            Ok(Action::Progress {
                kind: ActionKind::PreviewPolling,
                payload,
            }) => {
                let log = payload
                    .get("log")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default();

                let written = match log_update(&shown, log) {
                    LogUpdate::Append(tail) => write!(stdout, "{tail}"),
                    LogUpdate::Replace(full) => write!(stdout, "\n{full}"),
                };
                if let Err(e) = written.and_then(|_| stdout.flush()) {
                    tracing::warn!(error = %e, "Failed to write log output");
                }
                shown = log.to_string();
            }
            Ok(Action::Unauthenticated) => {
                tracing::warn!("Access token rejected, check TYPEFAST_ACCESS_TOKEN");
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Progress output lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
