//! Post-processors: how the resolved identifier is exposed outward.

use http::header::HeaderName;
use http::request;

use crate::error::IdError;
use crate::traits::IdPostProcessor;
use crate::types::{RequestId, ResponseWriter};

/// Sets a named response header to the identifier, replacing every value
/// previously set under that name.
#[derive(Debug, Clone)]
pub struct HeaderPostProcessor {
    header: HeaderName,
}

impl HeaderPostProcessor {
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl IdPostProcessor for HeaderPostProcessor {
    fn process(
        &self,
        response: &mut dyn ResponseWriter,
        _request: &mut request::Parts,
        id: &RequestId,
    ) -> Result<(), IdError> {
        let value = id
            .to_header_value()
            .map_err(|source| IdError::InvalidHeaderValue {
                header: self.header.clone(),
                source,
            })?;
        response.headers_mut().insert(self.header.clone(), value);
        Ok(())
    }
}

/// Delegates exposure to a caller-supplied function.
pub struct FnPostProcessor<F> {
    f: F,
}

impl<F> FnPostProcessor<F>
where
    F: Fn(&mut dyn ResponseWriter, &mut request::Parts, &RequestId) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IdPostProcessor for FnPostProcessor<F>
where
    F: Fn(&mut dyn ResponseWriter, &mut request::Parts, &RequestId) + Send + Sync,
{
    fn process(
        &self,
        response: &mut dyn ResponseWriter,
        request: &mut request::Parts,
        id: &RequestId,
    ) -> Result<(), IdError> {
        (self.f)(response, request, id);
        Ok(())
    }
}
