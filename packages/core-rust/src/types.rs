use std::fmt;

use http::header::InvalidHeaderValue;
use http::{HeaderMap, HeaderValue};

/// Opaque per-request identifier.
///
/// An empty identifier means "no identifier". Consumers must treat the
/// contents as an opaque token and never parse it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps an existing string as an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns `true` if no identifier was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Encodes the identifier as an HTTP header value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHeaderValue`] if the identifier contains control characters.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mutable view of an outgoing response, as seen by save handlers and
/// post-processors before the downstream handler runs.
pub trait ResponseWriter {
    /// Headers that will be sent with the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;
}

impl<B> ResponseWriter for http::Response<B> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        http::Response::headers_mut(self)
    }
}

impl ResponseWriter for http::response::Parts {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

/// A bare `HeaderMap` acts as a staging area for response headers that are
/// applied once the real response exists.
impl ResponseWriter for HeaderMap {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self
    }
}
