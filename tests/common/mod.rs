//! Shared fixtures: a user store, its route group, and a raw HTTP/1.1 client.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use missive::{HandlerError, Json, Request, Response, RouteGroup, Routes};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub name: String,
    pub age: u32,
}

#[derive(Default)]
pub struct UserStore {
    users: Mutex<Vec<User>>,
}

impl UserStore {
    pub fn with(users: &[(&str, u32)]) -> Self {
        let store = Self::default();
        for (name, age) in users {
            store.add(User { name: (*name).to_owned(), age: *age });
        }
        store
    }

    pub fn add(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn find(&self, name: &str) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.name == name).cloned()
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

pub struct UserRoutes {
    pub store: UserStore,
    pub calls: AtomicUsize,
}

impl UserRoutes {
    pub fn new(store: UserStore) -> Self {
        Self { store, calls: AtomicUsize::new(0) }
    }

    fn fetch_user(&self, req: &Request, _res: &mut Response) -> Result<Json<Option<User>>, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = req.param("name").unwrap_or_default();
        Ok(Json(self.store.find(name)))
    }

    fn users(&self, _req: &Request, _res: &mut Response) -> Result<Json<Vec<User>>, HandlerError> {
        Ok(Json(self.store.all()))
    }

    fn insert(&self, req: &Request, _res: &mut Response) -> Result<Json<User>, HandlerError> {
        let name = req.param("name").ok_or_else(|| HandlerError::msg("missing parameter `name`"))?;
        let age = req.param("age").unwrap_or_default().parse()?;
        let user = User { name: name.to_owned(), age };
        self.store.add(user.clone());
        Ok(Json(user))
    }

    fn ping(&self, _req: &Request, _res: &mut Response) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl RouteGroup for UserRoutes {
    fn routes(routes: &mut Routes<Self>) {
        routes
            .base("/v1")
            .get("/user", Self::fetch_user)
            .get("/users", Self::users)
            .post("/put", Self::insert)
            .get("/ping", Self::ping)
            .delete("/ping", Self::ping);
    }
}

pub struct Reply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

/// Sends one request with `Connection: close` and reads the whole response.
pub async fn send(addr: SocketAddr, method: &str, target: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let head = format!("{method} {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(head.as_bytes()).await.expect("write request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");
    let text = String::from_utf8(raw).expect("utf-8 response");

    let (head, body) = text.split_once("\r\n\r\n").expect("header terminator");
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .expect("status line");
    let content_type = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.trim().to_owned());

    Reply {
        status,
        content_type,
        body: serde_json::from_str(body).expect("json body"),
    }
}
