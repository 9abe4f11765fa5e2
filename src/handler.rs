//! Handler trait, type erasure and failure capture.
//!
//! # How handlers are stored
//!
//! A route table holds handlers declared on *different* route-group types,
//! each with its own return type. Rust collections hold one concrete type, so
//! every handler is bound to its group instance and erased behind
//! `dyn ErasedHandler`:
//!
//! ```text
//! fn fetch_user(&self, req: &Request, res: &mut Response)
//!     -> Result<Json<User>, HandlerError>           ← user writes this
//!        ↓ routes.get("/user", Self::fetch_user)
//! fetch_user.into_bound(Arc<UserRoutes>)            ← Handler blanket impl
//!        ↓
//! Box::new(Bound { group, handler })                ← stored as BoundHandler
//!        ↓
//! handler.call(&req, &mut res)  at request time     ← one vtable dispatch
//!        ↓
//! Result<Reply, HandlerError>                       ← value, no value, or failure
//! ```

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::reply::{IntoReply, Reply};
use crate::request::Request;
use crate::response::Response;

// ── HandlerError ──────────────────────────────────────────────────────────────

/// Why a handler failed.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into it, so `?`
/// works inside handlers. The client-facing message is taken from the
/// innermost cause in the error's `source()` chain, or from the error itself
/// when the innermost cause has nothing to say.
///
/// Deliberately not a `std::error::Error` itself: that would collide with the
/// blanket `From` impl.
#[derive(Debug)]
pub struct HandlerError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl HandlerError {
    /// A failure with a fixed message and no underlying cause.
    pub fn msg(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_owned());
        Self::msg(message)
    }
}

impl<E> From<E> for HandlerError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        let message = innermost_message(&err);
        Self { message, source: Some(Box::new(err)) }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn innermost_message(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    let message = current.to_string();
    if message.is_empty() { err.to_string() } else { message }
}

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_bound` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: &Request, res: &mut Response) -> Result<Reply, HandlerError>;
}

/// A handler bound to its route-group instance, shared by concurrent exchanges.
#[doc(hidden)]
pub type BoundHandler = Box<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid handler of route group `G`.
///
/// You never implement this yourself. It is satisfied by any function with
/// the signature:
///
/// ```text
/// fn name(&G, &Request, &mut Response) -> Result<impl IntoReply, impl Into<HandlerError>>
/// ```
///
/// Sealed via the private `Sealed` supertrait: only the blanket impl below
/// can satisfy it.
pub trait Handler<G>: private::Sealed<G> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_bound(self, group: Arc<G>) -> BoundHandler;
}

mod private {
    pub trait Sealed<G> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<G, F, R, E> private::Sealed<G> for F
where
    G: Send + Sync + 'static,
    F: Fn(&G, &Request, &mut Response) -> Result<R, E> + Send + Sync + 'static,
    R: IntoReply,
    E: Into<HandlerError>,
{
}

impl<G, F, R, E> Handler<G> for F
where
    G: Send + Sync + 'static,
    F: Fn(&G, &Request, &mut Response) -> Result<R, E> + Send + Sync + 'static,
    R: IntoReply,
    E: Into<HandlerError>,
{
    fn into_bound(self, group: Arc<G>) -> BoundHandler {
        Box::new(Bound { group, handler: self })
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Holds the owning group instance next to the handler function, bridging the
/// typed world to the trait-object world.
struct Bound<G, F> {
    group: Arc<G>,
    handler: F,
}

impl<G, F, R, E> ErasedHandler for Bound<G, F>
where
    F: Fn(&G, &Request, &mut Response) -> Result<R, E>,
    R: IntoReply,
    E: Into<HandlerError>,
{
    fn call(&self, req: &Request, res: &mut Response) -> Result<Reply, HandlerError> {
        match (self.handler)(&*self.group, req, res) {
            Ok(reply) => reply.into_reply(),
            Err(err) => Err(err.into()),
        }
    }
}
