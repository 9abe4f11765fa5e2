//! Start / stop state machine.

use std::time::{Duration, Instant};

use missive::{ConfigError, Error, Server, health::Health};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

use common::{UserRoutes, UserStore, send};

fn local(port: u16) -> missive::Builder {
    Server::builder(port)
        .host([127, 0, 0, 1].into())
        .shutdown_grace(Duration::from_millis(500))
}

#[tokio::test]
async fn second_start_fails_and_keeps_running() {
    let mut server = local(38231).build().unwrap();
    server.start().await.unwrap();
    let addr = server.local_addr();

    let err = server.start().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning));
    assert!(server.is_running());
    assert_eq!(server.local_addr(), addr);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn stop_twice_fails_second_time() {
    let mut server = local(38232).build().unwrap();
    server.start().await.unwrap();
    server.stop().await.unwrap();
    assert!(!server.is_running());

    let err = server.stop().await.unwrap_err();
    assert!(matches!(err, Error::NotRunning));
    assert!(!server.is_running());
}

#[tokio::test]
async fn stopped_server_can_start_again() {
    let mut server = local(38233)
        .group(UserRoutes::new(UserStore::with(&[("Des", 32)])))
        .build()
        .unwrap();

    server.start().await.unwrap();
    server.stop().await.unwrap();
    assert!(tokio::net::TcpStream::connect("127.0.0.1:38233").await.is_err());

    server.start().await.unwrap();
    let addr = server.local_addr().unwrap();
    let reply = send(addr, "GET", "/v1/user?name=Des").await;
    assert_eq!(reply.body, json!({"success": true, "value": {"name": "Des", "age": 32}}));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn bind_failure_leaves_server_stopped() {
    let _holder = tokio::net::TcpListener::bind("127.0.0.1:38234").await.unwrap();
    let mut server = local(38234).build().unwrap();

    let err = server.start().await.unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!server.is_running());
}

#[tokio::test]
async fn stop_closes_idle_keep_alive_connections_at_once() {
    let mut server = Server::builder(38235)
        .host([127, 0, 0, 1].into())
        .shutdown_grace(Duration::from_secs(5))
        .group(Health)
        .build()
        .unwrap();
    server.start().await.unwrap();

    let mut stream = TcpStream::connect("127.0.0.1:38235").await.unwrap();
    stream.write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    while !raw.ends_with(br#""value":"ok"}"#) {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "connection closed before the response arrived");
        raw.extend_from_slice(&buf[..n]);
    }
    assert!(raw.starts_with(b"HTTP/1.1 200"));

    // The connection is now idle and kept alive.
    let started = Instant::now();
    server.stop().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1), "stop took {:?}", started.elapsed());

    let closed = stream.read(&mut buf).await;
    assert!(!matches!(closed, Ok(n) if n > 0), "connection still open after stop");
}

#[test]
fn invalid_declarations_abort_construction() {
    assert!(matches!(
        Server::builder(0).build().err(),
        Some(Error::Config(ConfigError::InvalidPort)),
    ));
}
