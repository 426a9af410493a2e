//! Preview execution pipeline.
//!
//! Submitting a preview persists the script, creates a one-shot schedule
//! on the `preview` queue and resolves the routine it spawned
//! ([`PreviewSubmitter`]). The routine is then polled until the runner
//! marks it completed ([`RoutinePoller`]). [`PreviewPipeline`] chains
//! both and hands out a stoppable [`PreviewHandle`].
//!
//! Every logical operation reports through an
//! [`ActionDispatcher`](typefast_events::ActionDispatcher): one `started`,
//! then one `succeeded` or `failed`.

pub mod error;
pub mod poller;
pub mod preview;
pub mod schedule;
pub mod submitter;

mod operation;

pub use error::PreviewError;
pub use poller::{PollOutcome, RoutinePoller, DEFAULT_POLL_INTERVAL};
pub use preview::{PreviewHandle, PreviewOutcome, PreviewPipeline};
pub use schedule::ScheduleEditor;
pub use submitter::{PreviewSubmitter, SubmittedPreview};
