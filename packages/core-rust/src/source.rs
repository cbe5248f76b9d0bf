//! Identifier sources: where an inbound identifier is looked up.

use http::header::HeaderName;
use http::request;
use tracing::debug;

use crate::traits::IdSource;
use crate::types::RequestId;

/// Reads the first value of a named request header, verbatim.
#[derive(Debug, Clone)]
pub struct HeaderSource {
    header: HeaderName,
}

impl HeaderSource {
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl IdSource for HeaderSource {
    fn get_id(&self, request: &request::Parts) -> Option<RequestId> {
        let value = request.headers.get(&self.header)?;
        // Header values may carry opaque bytes; anything that is not UTF-8
        // cannot round-trip as an identifier.
        match std::str::from_utf8(value.as_bytes()) {
            Ok(value) => Some(RequestId::from(value)),
            Err(error) => {
                debug!(header = %self.header, %error, "ignoring non-UTF-8 inbound request id");
                None
            }
        }
    }
}

/// Delegates extraction to a caller-supplied function (cookies, query
/// parameters, extensions, ...).
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F>
where
    F: Fn(&request::Parts) -> Option<RequestId> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IdSource for FnSource<F>
where
    F: Fn(&request::Parts) -> Option<RequestId> + Send + Sync,
{
    fn get_id(&self, request: &request::Parts) -> Option<RequestId> {
        (self.f)(request)
    }
}
