//! Save handlers: where the resolved identifier is recorded for downstream code.

use http::header::HeaderName;
use http::request;

use crate::context::RequestScope;
use crate::error::IdError;
use crate::traits::IdSaveHandler;
use crate::types::{RequestId, ResponseWriter};

/// Overwrites a named header on the *inbound request*, so handlers further
/// down the same chain can read the identifier back from the request.
#[derive(Debug, Clone)]
pub struct HeaderSaveHandler {
    header: HeaderName,
}

impl HeaderSaveHandler {
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl IdSaveHandler for HeaderSaveHandler {
    fn save_id(
        &self,
        _response: &mut dyn ResponseWriter,
        request: &mut request::Parts,
        id: &RequestId,
    ) -> Result<(), IdError> {
        let value = id
            .to_header_value()
            .map_err(|source| IdError::InvalidHeaderValue {
                header: self.header.clone(),
                source,
            })?;
        request.headers.insert(self.header.clone(), value);
        Ok(())
    }
}

/// Stores the identifier in the request's [`RequestScope`] under a key.
#[derive(Debug, Clone)]
pub struct ContextSaveHandler {
    key: String,
}

impl ContextSaveHandler {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl IdSaveHandler for ContextSaveHandler {
    fn save_id(
        &self,
        _response: &mut dyn ResponseWriter,
        request: &mut request::Parts,
        id: &RequestId,
    ) -> Result<(), IdError> {
        RequestScope::get_or_insert(&mut request.extensions).set(self.key.clone(), id.clone());
        Ok(())
    }
}

/// Delegates storage to a caller-supplied function.
pub struct FnSaveHandler<F> {
    f: F,
}

impl<F> FnSaveHandler<F>
where
    F: Fn(&mut dyn ResponseWriter, &mut request::Parts, &RequestId) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IdSaveHandler for FnSaveHandler<F>
where
    F: Fn(&mut dyn ResponseWriter, &mut request::Parts, &RequestId) + Send + Sync,
{
    fn save_id(
        &self,
        response: &mut dyn ResponseWriter,
        request: &mut request::Parts,
        id: &RequestId,
    ) -> Result<(), IdError> {
        (self.f)(response, request, id);
        Ok(())
    }
}
