//! Action notifications emitted by the preview pipeline.
//!
//! - [`ActionDispatcher`]: the observer contract every pipeline step
//!   reports through (`started` / `progress` / `succeeded` / `failed`).
//! - [`Action`] and [`ActionKind`]: the notification envelope.
//! - [`ActionBus`]: the default dispatcher, an in-process fan-out
//!   channel backed by `tokio::sync::broadcast`.

pub mod action;
pub mod bus;

pub use action::{Action, ActionDispatcher, ActionKind};
pub use bus::ActionBus;
