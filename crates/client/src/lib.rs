//! HTTP client for the TypeFast routine runner API.
//!
//! Builds authenticated requests ([`RequestBuilder`]), classifies
//! responses ([`ensure_success`]) and exposes the typed endpoints the
//! preview pipeline needs ([`RoutineApi`]). The network layer sits
//! behind the [`Transport`] trait so callers can swap in instrumented
//! transports.

pub mod api;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;

pub use api::RoutineApi;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use request::{ApiRequest, FormBody, Params, RequestBuilder, ACCESS_TOKEN};
pub use response::{ensure_success, ApiResponse};
pub use session::Session;
pub use transport::{HttpTransport, Transport};
