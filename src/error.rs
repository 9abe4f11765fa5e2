//! Unified error type.

use crate::method::Method;

/// The error type returned by missive's fallible operations.
///
/// Per-request problems (cancelled exchanges, unknown methods, failing
/// handlers) never show up here: they are answered with a JSON envelope and a
/// status code. This type surfaces configuration mistakes, lifecycle misuse
/// and listener I/O failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("server is already running")]
    AlreadyRunning,

    #[error("server is not running")]
    NotRunning,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// A route or server declaration that cannot be served.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("route group `{group}` does not declare a base path")]
    MissingRoute { group: &'static str },

    #[error("{method} {path} is registered more than once")]
    DuplicateRoute { method: Method, path: String },

    #[error("port must be between 1 and 65535")]
    InvalidPort,
}
