//! What a handler hands back, and the [`IntoReply`] conversion trait.

use serde::Serialize;
use serde_json::Value;

use crate::handler::HandlerError;

/// The result of a handler that ran to completion.
///
/// `Value` may hold JSON `null`: "returned nothing useful" is still a value.
/// `NoValue` is reserved for handlers whose return type carries no payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Value(Value),
    NoValue,
}

/// Conversion into a [`Reply`].
///
/// Implemented for `()` (no value), [`Json`], `serde_json::Value` and plain
/// strings. Wrap any `Serialize` type in [`Json`] to return it:
///
/// ```rust
/// use missive::{HandlerError, Json, Request, Response};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String, age: u32 }
///
/// struct Users;
///
/// impl Users {
///     fn find(&self, req: &Request, _res: &mut Response) -> Result<Json<Option<User>>, HandlerError> {
///         let user = req.param("name").map(|n| User { name: n.to_owned(), age: 32 });
///         Ok(Json(user))
///     }
/// }
/// ```
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, HandlerError>;
}

/// A handler return value serialized with serde.
#[derive(Clone, Debug)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Value(serde_json::to_value(&self.0)?))
    }
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, HandlerError> { Ok(self) }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, HandlerError> { Ok(Reply::NoValue) }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, HandlerError> { Ok(Reply::Value(self)) }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, HandlerError> { Ok(Reply::Value(Value::String(self))) }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, HandlerError> { Ok(Reply::Value(Value::from(self))) }
}
