//! Minimal missive demo: a user store behind `/v1`, a request-logging event,
//! an API-key gate and the health probes.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example users
//!
//! Try:
//!   curl -H 'x-api-key: demo' 'http://localhost:8080/v1/user?name=Des'
//!   curl -H 'x-api-key: demo' 'http://localhost:8080/v1/users'
//!   curl -H 'x-api-key: demo' -X POST 'http://localhost:8080/v1/put?name=Maria&age=21'
//!   curl 'http://localhost:8080/v1/users'          # 403, no key
//!   curl 'http://localhost:8080/healthz'           # health probes skip the key check

use std::sync::Mutex;

use missive::{
    HandlerError, Json, Request, Response, RouteGroup, Routes, Server, Verdict, health::Health,
};
use serde::Serialize;
use tracing::info;

#[derive(Clone, Serialize)]
struct User {
    name: String,
    age: u32,
}

struct UserRoutes {
    users: Mutex<Vec<User>>,
}

impl RouteGroup for UserRoutes {
    fn routes(routes: &mut Routes<Self>) {
        routes
            .base("/v1")
            .get("/user", Self::fetch_user)
            .get("/users", Self::users)
            .post("/put", Self::insert);
    }
}

impl UserRoutes {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, HandlerError> {
        self.users.lock().map_err(|_| HandlerError::msg("user store is poisoned"))
    }

    // GET /v1/user?name=… → the user, or null
    fn fetch_user(&self, req: &Request, _res: &mut Response) -> Result<Json<Option<User>>, HandlerError> {
        let name = req.param("name").unwrap_or_default();
        info!(name, "fetching user");
        Ok(Json(self.lock()?.iter().find(|u| u.name == name).cloned()))
    }

    // GET /v1/users
    fn users(&self, _req: &Request, _res: &mut Response) -> Result<Json<Vec<User>>, HandlerError> {
        Ok(Json(self.lock()?.clone()))
    }

    // POST /v1/put?name=…&age=…
    fn insert(&self, req: &Request, _res: &mut Response) -> Result<Json<User>, HandlerError> {
        let name = req.param("name").ok_or_else(|| HandlerError::msg("missing parameter `name`"))?;
        let age = req.param("age").unwrap_or_default().parse()?;
        let user = User { name: name.to_owned(), age };
        self.lock()?.push(user.clone());
        Ok(Json(user))
    }
}

#[tokio::main]
async fn main() -> Result<(), missive::Error> {
    tracing_subscriber::fmt::init();

    let users = UserRoutes {
        users: Mutex::new(vec![
            User { name: "Des".into(), age: 32 },
            User { name: "Preston".into(), age: 23 },
        ]),
    };

    Server::builder(8080)
        .group(users)
        .group(Health)
        .event(|req: &Request, _res: &mut Response| {
            info!(method = req.raw_method(), uri = %req.uri(), peer = %req.remote_addr(), "request");
            Verdict::Proceed
        })
        .event(|req: &Request, _res: &mut Response| {
            let probe = req.path() == "/healthz" || req.path() == "/readyz";
            if probe || req.header("x-api-key").is_some() {
                Verdict::Proceed
            } else {
                Verdict::Cancel
            }
        })
        .build()?
        .run()
        .await
}
