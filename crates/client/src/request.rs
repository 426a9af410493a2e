//! Authenticated URL and form-body construction.
//!
//! Every request carries the session's `access_token`: reads put it in
//! the query string, writes put it in the form body.

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::session::Session;

/// Name of the credential parameter the server expects.
pub const ACCESS_TOKEN: &str = "access_token";

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Ordered key/value parameters for a query string or form body.
///
/// Keys keep insertion order so the encoded output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    /// An empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key = value`, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Append `key = value`.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries, nulls included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Caller entries as encoded strings, minus nulls and any
    /// caller-supplied credential.
    fn encoded(&self) -> impl Iterator<Item = (&str, String)> {
        self.iter()
            .filter(|(key, _)| *key != ACCESS_TOKEN)
            .filter_map(|(key, value)| encode_value(value).map(|v| (key, v)))
    }
}

/// Render a parameter value as text.
///
/// Structured values become JSON. `null` yields `None`: the server treats
/// a missing key and a null value the same way.
fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

// ---------------------------------------------------------------------------
// FormBody
// ---------------------------------------------------------------------------

/// An `application/x-www-form-urlencoded` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    /// Encoded pairs in body order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Body text for `application/x-www-form-urlencoded`.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ApiRequest
// ---------------------------------------------------------------------------

/// A fully built request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub form: Option<FormBody>,
}

impl ApiRequest {
    /// A GET with no body.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            form: None,
        }
    }

    /// A POST carrying `form` as its body.
    pub fn post(url: Url, form: FormBody) -> Self {
        Self {
            method: Method::POST,
            url,
            form: Some(form),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestBuilder
// ---------------------------------------------------------------------------

/// Builds fully-qualified, authenticated URLs and bodies.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
    session: Session,
}

impl RequestBuilder {
    /// * `base_url` - API root, e.g. `http://host:8080/`.
    pub fn new(base_url: Url, session: Session) -> Self {
        Self { base_url, session }
    }

    /// API root endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session whose token is attached to every request.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve `segments` under the base URL, without a query string.
    ///
    /// Segments are percent-encoded individually, so ids cannot escape
    /// their path position.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolve `segments` and append `query` plus the session token.
    ///
    /// The token always comes last and always equals the session's
    /// current value, even when `query` is empty.
    pub fn url(&self, segments: &[&str], query: &Params) -> Result<Url, ApiError> {
        let mut url = self.endpoint(segments)?;
        let token = self.session.token();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.encoded() {
                pairs.append_pair(key, &value);
            }
            pairs.append_pair(ACCESS_TOKEN, &token);
        }
        Ok(url)
    }

    /// Build a form body: the session token first, then `body` in order.
    pub fn form(&self, body: &Params) -> FormBody {
        let mut pairs = Vec::with_capacity(body.len() + 1);
        pairs.push((ACCESS_TOKEN.to_string(), self.session.token()));
        pairs.extend(body.encoded().map(|(k, v)| (k.to_string(), v)));
        FormBody { pairs }
    }
}
