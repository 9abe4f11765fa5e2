//! Built-in Kubernetes health-check routes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Add them as a route group:
//!
//! ```rust,no_run
//! use missive::{Server, health::Health};
//!
//! # fn main() -> Result<(), missive::Error> {
//! let server = Server::builder(8080).group(Health).build()?;
//! # Ok(())
//! # }
//! ```
//!
//! Both answer with the usual envelope, e.g. `{"success":true,"value":"ok"}`.
//! Events run in front of them like any other route.

use crate::handler::HandlerError;
use crate::request::Request;
use crate::response::Response;
use crate::router::{RouteGroup, Routes};

/// Liveness and readiness probes mounted at the root.
pub struct Health;

impl RouteGroup for Health {
    fn routes(routes: &mut Routes<Self>) {
        routes
            .base("")
            .get("/healthz", Self::liveness)
            .get("/readyz", Self::readiness);
    }
}

impl Health {
    /// If the process can answer at all, it is alive.
    fn liveness(&self, _req: &Request, _res: &mut Response) -> Result<&'static str, HandlerError> {
        Ok("ok")
    }

    fn readiness(&self, _req: &Request, _res: &mut Response) -> Result<&'static str, HandlerError> {
        Ok("ready")
    }
}
