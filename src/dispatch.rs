//! Per-exchange dispatch.
//!
//! One exchange moves through these steps, and every path ends with exactly
//! one envelope:
//!
//! ```text
//! lookup path ──miss──────────────────────────────────────────► 404
//!      │
//! run events ──any cancelled─────────────────────────────────► 403
//!      │
//! parse method ──absent──────────────────────────────────────► 400
//!      │
//! pick route ──no handler for method─────────────────────────► 405
//!      │
//! invoke handler ──value────────────────► {success,value}  (status as left)
//!      │          ──no value, GET───────► {}               400
//!      │          ──no value, other─────► {}               (status as left)
//!      │          ──error / panic───────► {success,error}  500 if still 200
//!      ▼
//! encode + send
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use http_body_util::Full;
use tracing::{debug, error, warn};

use crate::codec::Codec;
use crate::event::{Pipeline, Verdict};
use crate::handler::HandlerError;
use crate::method::Method;
use crate::reply::Reply;
use crate::request::Request;
use crate::response::{Envelope, Response};
use crate::router::{Route, RouteTable};
use crate::status::Status;

pub(crate) const CANCELLED: &str = "Request has been cancelled internally";
pub(crate) const METHOD_ABSENT: &str = "Request method is null";
pub(crate) const NO_ROUTE: &str = "No route registered for this path";
pub(crate) const METHOD_NOT_ALLOWED: &str = "Request method is not allowed for this path";
const DISPATCH_FAILED: &str = "Request could not be dispatched";

/// Sent when the codec itself fails; hand-written so it cannot fail again.
const ENCODE_FAILED: &[u8] = br#"{"success":false,"error":"Response could not be encoded"}"#;

/// Final status and body of one exchange, before encoding.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) status: Status,
    pub(crate) envelope: Envelope,
}

impl Outcome {
    fn failure(status: Status, error: &str) -> Self {
        Self { status, envelope: Envelope::failure(error) }
    }

    /// For exchanges whose dispatch never produced an outcome.
    pub(crate) fn dispatch_failed() -> Self {
        Self::failure(Status::INTERNAL_SERVER_ERROR, DISPATCH_FAILED)
    }
}

/// Routes, events and codec, shared read-only by every exchange.
pub(crate) struct Dispatcher {
    routes: RouteTable,
    pipeline: Pipeline,
    codec: Arc<dyn Codec>,
}

impl Dispatcher {
    pub(crate) fn new(routes: RouteTable, pipeline: Pipeline, codec: Arc<dyn Codec>) -> Self {
        Self { routes, pipeline, codec }
    }

    pub(crate) fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub(crate) fn event_count(&self) -> usize {
        self.pipeline.len()
    }

    /// Runs one exchange from events to handler and decides its envelope.
    pub(crate) fn dispatch(&self, req: &Request) -> Outcome {
        let Some(entry) = self.routes.lookup(req.path()) else {
            return Outcome::failure(Status::NOT_FOUND, NO_ROUTE);
        };

        let mut res = Response::new();

        if self.pipeline.run(req, &mut res) == Verdict::Cancel {
            debug!("exchange cancelled by event");
            return Outcome::failure(Status::FORBIDDEN, CANCELLED);
        }

        let Some(method) = req.method() else {
            return Outcome::failure(Status::BAD_REQUEST, METHOD_ABSENT);
        };

        let Some(route) = entry.route(method) else {
            return Outcome::failure(Status::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED);
        };

        let envelope = match invoke(route, req, &mut res) {
            Ok(Reply::Value(value)) => Envelope::success(value),
            Ok(Reply::NoValue) if route.method == Method::Get => {
                warn!(group = route.group, path = req.path(), "GET handler returned no value");
                res.set_status(Status::BAD_REQUEST);
                Envelope::empty()
            }
            Ok(Reply::NoValue) => Envelope::empty(),
            Err(err) => {
                error!(group = route.group, path = req.path(), error = %err, "failed handling request");
                if res.is_default() {
                    res.set_status(Status::INTERNAL_SERVER_ERROR);
                }
                Envelope::failure(err.message())
            }
        };

        Outcome { status: res.status(), envelope }
    }

    /// Encodes an outcome into the HTTP response written to the client.
    pub(crate) fn render(&self, outcome: Outcome) -> http::Response<Full<Bytes>> {
        let (status, body) = match self.codec.encode(&outcome.envelope) {
            Ok(body) => (outcome.status, body),
            Err(e) => {
                error!("failed encoding envelope: {e}");
                (Status::INTERNAL_SERVER_ERROR, ENCODE_FAILED.to_vec())
            }
        };

        debug!(status = status.code(), body = %String::from_utf8_lossy(&body), "sending envelope");

        let length = body.len();
        let mut response = http::Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status.to_http();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        response
    }
}

/// Calls the handler, turning a panic into an ordinary handler failure.
fn invoke(route: &Route, req: &Request, res: &mut Response) -> Result<Reply, HandlerError> {
    panic::catch_unwind(AssertUnwindSafe(|| route.handler.call(req, res)))
        .unwrap_or_else(|payload| Err(HandlerError::from_panic(payload)))
}
