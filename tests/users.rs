//! End-to-end exchanges against a running server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use missive::{Request, Response, Server, Status, Verdict, health::Health};
use serde_json::json;

mod common;

use common::{UserRoutes, UserStore, send};

fn user_routes() -> UserRoutes {
    UserRoutes::new(UserStore::with(&[("Des", 32), ("Maria", 21), ("Preston", 23)]))
}

async fn started(server: Server) -> (Server, SocketAddr) {
    let mut server = server;
    server.start().await.expect("start");
    let addr = server.local_addr().expect("bound address");
    (server, addr)
}

fn local(port: u16) -> missive::Builder {
    Server::builder(port).host([127, 0, 0, 1].into())
}

#[tokio::test]
async fn get_existing_user() {
    let (mut server, addr) = started(local(38211).group(user_routes()).build().unwrap()).await;

    let reply = send(addr, "GET", "/v1/user?name=Des").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));
    assert_eq!(reply.body, json!({"success": true, "value": {"name": "Des", "age": 32}}));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn get_unknown_user_is_null_value() {
    let (mut server, addr) = started(local(38212).group(user_routes()).build().unwrap()).await;

    let reply = send(addr, "GET", "/v1/user?name=Unknown").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!({"success": true, "value": null}));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn post_creates_user() {
    let (mut server, addr) = started(local(38213).group(user_routes()).build().unwrap()).await;

    let reply = send(addr, "POST", "/v1/put?name=Maria&age=21").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!({"success": true, "value": {"name": "Maria", "age": 21}}));

    let reply = send(addr, "POST", "/v1/put?name=Ana&age=40").await;
    assert_eq!(reply.body["value"], json!({"name": "Ana", "age": 40}));
    let reply = send(addr, "GET", "/v1/user?name=Ana").await;
    assert_eq!(reply.body, json!({"success": true, "value": {"name": "Ana", "age": 40}}));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn handler_failure_is_reported() {
    let (mut server, addr) = started(local(38214).group(user_routes()).build().unwrap()).await;

    let reply = send(addr, "POST", "/v1/put?name=Bob&age=old").await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, json!({"success": false, "error": "invalid digit found in string"}));

    let reply = send(addr, "POST", "/v1/put?age=3").await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, json!({"success": false, "error": "missing parameter `name`"}));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn unparseable_method_is_bad_request() {
    let (mut server, addr) = started(local(38215).group(user_routes()).build().unwrap()).await;

    let reply = send(addr, "PATCH", "/v1/user?name=Des").await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body, json!({"success": false, "error": "Request method is null"}));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn no_value_depends_on_declared_method() {
    let (mut server, addr) = started(local(38216).group(user_routes()).build().unwrap()).await;

    let reply = send(addr, "GET", "/v1/ping").await;
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body, json!({}));

    let reply = send(addr, "DELETE", "/v1/ping").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!({}));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn cancelling_event_blocks_handler() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let routes = user_routes();

    let server = local(38217)
        .group(routes)
        .event(move |_req: &Request, _res: &mut Response| {
            counter.fetch_add(1, Ordering::SeqCst);
            Verdict::Proceed
        })
        .event(|req: &Request, _res: &mut Response| {
            if req.header("x-api-key").is_some() { Verdict::Proceed } else { Verdict::Cancel }
        })
        .build()
        .unwrap();
    let (mut server, addr) = started(server).await;

    let reply = send(addr, "GET", "/v1/user?name=Des").await;
    assert_eq!(reply.status, 403);
    assert_eq!(reply.body, json!({"success": false, "error": "Request has been cancelled internally"}));
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn event_status_survives_handler_failure() {
    let server = local(38218)
        .group(user_routes())
        .event(|_req: &Request, res: &mut Response| {
            res.set_status(Status::TOO_MANY_REQUESTS);
            Verdict::Proceed
        })
        .build()
        .unwrap();
    let (mut server, addr) = started(server).await;

    let reply = send(addr, "POST", "/v1/put?name=Bob&age=old").await;
    assert_eq!(reply.status, 429);
    assert_eq!(reply.body["success"], json!(false));

    let reply = send(addr, "GET", "/v1/user?name=Des").await;
    assert_eq!(reply.status, 429);
    assert_eq!(reply.body["success"], json!(true));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn unknown_path_and_method_mismatch() {
    let (mut server, addr) = started(local(38219).group(user_routes()).group(Health).build().unwrap()).await;

    let reply = send(addr, "GET", "/v2/user").await;
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body["success"], json!(false));

    let reply = send(addr, "PUT", "/v1/user").await;
    assert_eq!(reply.status, 405);
    assert_eq!(reply.body["success"], json!(false));

    let reply = send(addr, "GET", "/healthz").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!({"success": true, "value": "ok"}));

    server.stop().await.unwrap();
}
