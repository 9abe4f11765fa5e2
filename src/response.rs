//! In-flight response state and the JSON envelope sent on the wire.
//!
//! Handlers and events never build the outgoing HTTP response themselves.
//! They adjust the [`Response`] status and return a value; the dispatcher
//! wraps the outcome in an [`Envelope`]:
//!
//! | Outcome | Body |
//! |---|---|
//! | handler returned a value | `{"success":true,"value":…}` |
//! | cancelled, invalid or failed | `{"success":false,"error":"…"}` |
//! | handler returned nothing | `{}` |

use serde::Serialize;
use serde_json::Value;

use crate::status::Status;

// ── Response ──────────────────────────────────────────────────────────────────

/// Mutable response state for one exchange.
///
/// Starts at [`Status::OK`]. Events run before the handler and may change it;
/// so may the handler. The dispatcher reads it once, after both.
#[derive(Debug)]
pub struct Response {
    status: Status,
}

impl Response {
    /// A fresh `200 OK` state. The dispatcher makes one per exchange; build
    /// your own to call handlers directly in tests.
    pub fn new() -> Self {
        Self { status: Status::OK }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// `true` while nothing has moved the status off the `200 OK` default.
    pub(crate) fn is_default(&self) -> bool {
        self.status == Status::OK
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// The uniform JSON body of every response.
///
/// Unset fields are omitted entirely; a `value` that is JSON `null` is still
/// written as `"value":null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Envelope {
    /// `{"success":true,"value":…}`
    pub fn success(value: Value) -> Self {
        Self { success: Some(true), value: Some(value), error: None }
    }

    /// `{"success":false,"error":"…"}`
    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: Some(false), value: None, error: Some(error.into()) }
    }

    /// `{}`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> Option<bool> { self.success }
    pub fn value(&self) -> Option<&Value> { self.value.as_ref() }
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }
}
