//! HTTP status codes and their range classification.
//!
//! A [`Status`] is a numeric code paired with a human description. The
//! catalogue below covers what the dispatcher itself emits plus the codes
//! handlers reach for most; anything else in `100..=599` can be built with
//! [`Status::new`].
//!
//! ```rust
//! use missive::{Class, Status};
//!
//! assert_eq!(Status::NOT_FOUND.class(), Class::ClientError);
//! assert_eq!(Class::of(510), Class::ServerError);
//!
//! const ENHANCE_YOUR_CALM: Status = match Status::new(420, "Enhance Your Calm") {
//!     Ok(status) => status,
//!     Err(_) => Status::TOO_MANY_REQUESTS,
//! };
//! assert!(ENHANCE_YOUR_CALM.is_client_error());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

/// Range classification of a status code, by hundreds digit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Informational, // 1xx
    Success,       // 2xx
    Redirect,      // 3xx
    ClientError,   // 4xx
    ServerError,   // 5xx
    Unknown,       // anything outside 100..=599
}

impl Class {
    /// Classifies any numeric code by range, catalogue membership is irrelevant.
    pub const fn of(code: u16) -> Self {
        match code {
            100..=199 => Self::Informational,
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _         => Self::Unknown,
        }
    }
}

/// Returned by [`Status::new`] for codes outside `100..=599`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("status code {0} is outside 100..=599")]
pub struct InvalidStatus(pub u16);

/// An immutable HTTP status: numeric code plus description.
///
/// Two statuses are equal when their codes are equal; the description is
/// informational only.
#[derive(Clone, Copy, Debug)]
pub struct Status {
    code: u16,
    description: &'static str,
}

impl Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    pub const OK: Status                            = Status::known(200, "OK");
    pub const CREATED: Status                       = Status::known(201, "Created");

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    pub const BAD_REQUEST: Status                   = Status::known(400, "Bad Request");
    pub const UNAUTHORIZED: Status                  = Status::known(401, "Unauthorized");
    pub const FORBIDDEN: Status                     = Status::known(403, "Forbidden");
    pub const NOT_FOUND: Status                     = Status::known(404, "Not Found");
    pub const METHOD_NOT_ALLOWED: Status            = Status::known(405, "Method Not Allowed");
    pub const GONE: Status                          = Status::known(410, "Gone");
    pub const IM_A_TEAPOT: Status                   = Status::known(418, "I'm a Teapot");
    pub const TOO_MANY_REQUESTS: Status             = Status::known(429, "Too Many Requests");
    pub const UNAVAILABLE_FOR_LEGAL_REASONS: Status = Status::known(451, "Unavailable For Legal Reasons");

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    pub const INTERNAL_SERVER_ERROR: Status         = Status::known(500, "Internal Server Error");
    pub const SERVICE_UNAVAILABLE: Status           = Status::known(503, "Service Unavailable");
    pub const INSUFFICIENT_STORAGE: Status          = Status::known(507, "Insufficient Storage");
    pub const LOOP_DETECTED: Status                 = Status::known(508, "Loop Detected");

    const CATALOGUE: [Status; 15] = [
        Self::OK,
        Self::CREATED,
        Self::BAD_REQUEST,
        Self::UNAUTHORIZED,
        Self::FORBIDDEN,
        Self::NOT_FOUND,
        Self::METHOD_NOT_ALLOWED,
        Self::GONE,
        Self::IM_A_TEAPOT,
        Self::TOO_MANY_REQUESTS,
        Self::UNAVAILABLE_FOR_LEGAL_REASONS,
        Self::INTERNAL_SERVER_ERROR,
        Self::SERVICE_UNAVAILABLE,
        Self::INSUFFICIENT_STORAGE,
        Self::LOOP_DETECTED,
    ];

    const fn known(code: u16, description: &'static str) -> Self {
        Self { code, description }
    }

    /// Builds a status outside the catalogue. Usable in `const` items.
    pub const fn new(code: u16, description: &'static str) -> Result<Self, InvalidStatus> {
        if code < 100 || code > 599 {
            return Err(InvalidStatus(code));
        }
        Ok(Self { code, description })
    }

    /// Looks a code up in the built-in catalogue.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::CATALOGUE.iter().copied().find(|s| s.code == code)
    }

    pub const fn code(self) -> u16 { self.code }
    pub const fn description(self) -> &'static str { self.description }
    pub const fn class(self) -> Class { Class::of(self.code) }

    pub const fn is_informational(self) -> bool { matches!(self.class(), Class::Informational) }
    pub const fn is_successful(self) -> bool { matches!(self.class(), Class::Success) }
    pub const fn is_redirect(self) -> bool { matches!(self.class(), Class::Redirect) }
    pub const fn is_client_error(self) -> bool { matches!(self.class(), Class::ClientError) }
    pub const fn is_server_error(self) -> bool { matches!(self.class(), Class::ServerError) }

    pub(crate) fn to_http(self) -> http::StatusCode {
        // Every constructible code is in 100..=599, which `http` always accepts.
        http::StatusCode::from_u16(self.code).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Status {}

impl Hash for Status {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.description)
    }
}
