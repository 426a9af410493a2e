//! Started / succeeded / failed bookkeeping around one logical operation.

use std::future::Future;

use typefast_events::{ActionDispatcher, ActionKind};

use crate::error::PreviewError;

/// Run `op` as one logical operation of `kind`.
///
/// Emits `started` before polling `op`, then exactly one of `succeeded`
/// (with `payload(&result)`) or `failed` (with the error's message).
pub(crate) async fn track<R, F, P>(
    dispatcher: &dyn ActionDispatcher,
    kind: ActionKind,
    op: F,
    payload: P,
) -> Result<R, PreviewError>
where
    F: Future<Output = Result<R, PreviewError>>,
    P: FnOnce(&R) -> serde_json::Value,
{
    dispatcher.started(kind);

    match op.await {
        Ok(result) => {
            dispatcher.succeeded(kind, payload(&result));
            Ok(result)
        }
        Err(e) => {
            tracing::error!(kind = %kind, error = %e, "Operation failed");
            dispatcher.failed(kind, e.to_string());
            Err(e)
        }
    }
}
