//! The four swappable capabilities composed by [`RequestIdInjector`](crate::RequestIdInjector).

use http::request;

use crate::error::IdError;
use crate::types::{RequestId, ResponseWriter};

/// Produces a fresh identifier when the request did not carry one.
pub trait IdGenerator: Send + Sync {
    /// Generates a new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Entropy`] when the underlying randomness is
    /// unavailable. The injector degrades this to an empty identifier.
    fn generate(&self) -> Result<RequestId, IdError>;
}

/// Extracts a pre-existing identifier from an inbound request.
pub trait IdSource: Send + Sync {
    /// Returns the identifier carried by the request, or `None` if absent.
    /// An empty identifier is treated the same as `None`.
    fn get_id(&self, request: &request::Parts) -> Option<RequestId>;
}

/// Records the resolved identifier where downstream handlers can read it.
pub trait IdSaveHandler: Send + Sync {
    /// Stores `id` for the lifetime of the request.
    ///
    /// # Errors
    ///
    /// Failures are logged by the injector and never abort the request.
    fn save_id(
        &self,
        response: &mut dyn ResponseWriter,
        request: &mut request::Parts,
        id: &RequestId,
    ) -> Result<(), IdError>;
}

/// Exposes the resolved identifier outward, usually on the response.
pub trait IdPostProcessor: Send + Sync {
    /// Publishes `id`.
    ///
    /// # Errors
    ///
    /// Failures are logged by the injector and never abort the request.
    fn process(
        &self,
        response: &mut dyn ResponseWriter,
        request: &mut request::Parts,
        id: &RequestId,
    ) -> Result<(), IdError>;
}
