//! Route groups and the route table.
//!
//! A route group is a plain struct that declares a base path and a list of
//! handlers, each tagged with a sub-path and a method. No attributes, no
//! reflection: the declaration is an ordinary function.
//!
//! ```rust
//! use missive::{HandlerError, Json, Request, Response, RouteGroup, Routes};
//!
//! struct Greetings;
//!
//! impl RouteGroup for Greetings {
//!     fn routes(routes: &mut Routes<Self>) {
//!         routes
//!             .base("/v1")
//!             .get("/hello", Self::hello)   // GET /v1/hello
//!             .delete("/hello", Self::forget);
//!     }
//! }
//!
//! impl Greetings {
//!     fn hello(&self, req: &Request, _res: &mut Response) -> Result<Json<String>, HandlerError> {
//!         Ok(Json(format!("hello {}", req.param("name").unwrap_or("stranger"))))
//!     }
//!
//!     fn forget(&self, _req: &Request, _res: &mut Response) -> Result<(), HandlerError> {
//!         Ok(())
//!     }
//! }
//! ```
//!
//! The full path is the base path concatenated with the sub-path, byte for
//! byte: `"/v1"` + `"user"` is `"/v1user"`. Lookup is an exact string match.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::handler::{BoundHandler, Handler};
use crate::method::Method;

/// A collection of handlers sharing a base path.
pub trait RouteGroup: Send + Sync + Sized + 'static {
    /// Declares the base path and the handlers. Must call [`Routes::base`];
    /// a group that does not is rejected when the server is built.
    fn routes(routes: &mut Routes<Self>);
}

type Binder<G> = Box<dyn FnOnce(Arc<G>) -> BoundHandler>;

struct Endpoint<G> {
    path: String,
    method: Method,
    bind: Binder<G>,
}

/// The declaration surface handed to [`RouteGroup::routes`].
///
/// Every method returns `&mut Self` so declarations chain.
pub struct Routes<G> {
    base: Option<String>,
    endpoints: Vec<Endpoint<G>>,
}

impl<G: Send + Sync + 'static> Routes<G> {
    fn new() -> Self {
        Self { base: None, endpoints: Vec::new() }
    }

    /// Sets the base path prefixed to every sub-path. May be empty.
    pub fn base(&mut self, path: &str) -> &mut Self {
        self.base = Some(path.to_owned());
        self
    }

    /// Registers a handler for a sub-path and method.
    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler<G>) -> &mut Self {
        self.endpoints.push(Endpoint {
            path: path.to_owned(),
            method,
            bind: Box::new(move |group| handler.into_bound(group)),
        });
        self
    }

    pub fn get(&mut self, path: &str, handler: impl Handler<G>) -> &mut Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler<G>) -> &mut Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler<G>) -> &mut Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler<G>) -> &mut Self {
        self.on(Method::Delete, path, handler)
    }
}

// ── Route table ───────────────────────────────────────────────────────────────

/// One registered handler.
pub(crate) struct Route {
    pub(crate) method: Method,
    pub(crate) group: &'static str,
    pub(crate) handler: BoundHandler,
}

/// Every route registered under one full path, keyed by method.
#[derive(Default)]
pub(crate) struct PathRoutes {
    by_method: HashMap<Method, Route>,
}

impl PathRoutes {
    pub(crate) fn route(&self, method: Method) -> Option<&Route> {
        self.by_method.get(&method)
    }
}

/// Full path → method → bound handler.
///
/// Built once before the server starts; read-only afterwards, so concurrent
/// exchanges share it without locking.
#[derive(Default)]
pub(crate) struct RouteTable {
    paths: HashMap<String, PathRoutes>,
}

impl RouteTable {
    /// Binds every handler `G` declares to one shared instance of `group`.
    /// Returns how many routes were added.
    pub(crate) fn register<G: RouteGroup>(&mut self, group: G) -> Result<usize, ConfigError> {
        let name = group_name::<G>();
        let mut routes = Routes::new();
        G::routes(&mut routes);

        let Some(base) = routes.base else {
            return Err(ConfigError::MissingRoute { group: name });
        };

        if routes.endpoints.is_empty() {
            warn!(group = name, "no routes found for route group");
            return Ok(0);
        }

        let group = Arc::new(group);
        let added = routes.endpoints.len();

        for endpoint in routes.endpoints {
            let path = format!("{base}{}", endpoint.path);
            let entry = self.paths.entry(path.clone()).or_default();
            if entry.by_method.contains_key(&endpoint.method) {
                return Err(ConfigError::DuplicateRoute { method: endpoint.method, path });
            }

            debug!(group = name, method = %endpoint.method, %path, "route registered");
            entry.by_method.insert(endpoint.method, Route {
                method: endpoint.method,
                group: name,
                handler: (endpoint.bind)(Arc::clone(&group)),
            });
        }

        info!(group = name, routes = added, "added routes");
        Ok(added)
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<&PathRoutes> {
        self.paths.get(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.paths.values().map(|p| p.by_method.len()).sum()
    }
}

/// Last path segment of the group's type name, for log fields and errors.
fn group_name<G>() -> &'static str {
    let full = std::any::type_name::<G>();
    full.rsplit("::").next().unwrap_or(full)
}
