//! # missive
//!
//! A minimal HTTP dispatch framework. Every request gets the same answer
//! shape: a JSON envelope and a status code.
//!
//! ## The contract
//!
//! - Route groups declare a base path and a set of handlers, each bound to a
//!   sub-path and a method. Full path = base + sub-path, verbatim.
//! - Events run before every handler, in registration order. Any of them can
//!   cancel the exchange (`403`); all of them still run.
//! - Only `GET`, `POST`, `PUT` and `DELETE` exist. Anything else is `400`.
//! - A handler returns a value (`{"success":true,"value":…}`), nothing
//!   (`{}`; a `GET` handler doing that is a `400`), or an error
//!   (`{"success":false,"error":…}`, `500` unless something already changed
//!   the status).
//!
//! What missive leaves to the proxy in front of it: TLS, auth, rate limiting,
//! request bodies. Nothing reads them.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use missive::{HandlerError, Json, Request, Response, RouteGroup, Routes, Server};
//!
//! struct Clock;
//!
//! impl RouteGroup for Clock {
//!     fn routes(routes: &mut Routes<Self>) {
//!         routes.base("/v1").get("/now", Self::now);
//!     }
//! }
//!
//! impl Clock {
//!     fn now(&self, _req: &Request, _res: &mut Response) -> Result<Json<u64>, HandlerError> {
//!         let secs = std::time::SystemTime::now()
//!             .duration_since(std::time::UNIX_EPOCH)?
//!             .as_secs();
//!         Ok(Json(secs))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), missive::Error> {
//!     // GET /v1/now → {"success":true,"value":1767225600}
//!     Server::builder(3000).group(Clock).build()?.run().await
//! }
//! ```

mod codec;
mod config;
mod dispatch;
mod error;
mod event;
mod handler;
mod method;
mod reply;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod health;

pub use codec::{Codec, JsonCodec};
pub use config::ServerConfig;
pub use error::{ConfigError, Error};
pub use event::{Event, Verdict};
pub use handler::{Handler, HandlerError};
pub use method::Method;
pub use reply::{IntoReply, Json, Reply};
pub use request::Request;
pub use response::{Envelope, Response};
pub use router::{RouteGroup, Routes};
pub use server::{Builder, Server};
pub use status::{Class, InvalidStatus, Status};
