//! Read-only view of an inbound request.

use std::collections::HashMap;
use std::net::SocketAddr;

use http::{HeaderMap, Uri};
use url::form_urlencoded;

use crate::method::Method;

/// An inbound request as handlers and events see it.
///
/// Built once per exchange from the request head; the body is never read.
/// Nothing here can be mutated after construction.
#[derive(Debug)]
pub struct Request {
    method: Option<Method>,
    raw_method: String,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    remote_addr: SocketAddr,
}

impl Request {
    /// Builds a request from its head. `method` is the wire string; a method
    /// outside [`Method`] is kept as [`raw_method`](Self::raw_method) and
    /// [`method`](Self::method) returns `None`.
    pub fn new(method: &str, uri: Uri, headers: HeaderMap, remote_addr: SocketAddr) -> Self {
        let params = parse_query(uri.query());
        Self {
            method: method.parse().ok(),
            raw_method: method.to_owned(),
            uri,
            headers,
            params,
            remote_addr,
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, remote_addr: SocketAddr) -> Self {
        Self::new(parts.method.as_str(), parts.uri, parts.headers, remote_addr)
    }

    pub fn method(&self) -> Option<Method> { self.method }
    pub fn raw_method(&self) -> &str { &self.raw_method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// First value of a header, case-insensitive. Non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// Every value of a header, in the order they arrived.
    pub fn header_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Total number of header values, counting repeated names once per value.
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Returns a query-string parameter.
    ///
    /// For `/v1/user?name=Des`, `req.param("name")` returns `Some("Des")`.
    /// A key without `=` maps to the empty string; a repeated key keeps its
    /// last value.
    ///
    /// Keys and values are form-decoded: `%XX` escapes are resolved and `+`
    /// becomes a space, so `?name=a+b%20c` yields `Some("a b c")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> { &self.params }
    pub fn param_count(&self) -> usize { self.params.len() }
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => form_urlencoded::parse(q.as_bytes()).into_owned().collect(),
        _ => HashMap::new(),
    }
}
