//! Bridges [`IdGenerator`]s into `tower-http`'s request-id middleware.
//!
//! Useful for stacks that already use `SetRequestIdLayer` and
//! `PropagateRequestIdLayer` but want this crate's identifier encodings.

use std::sync::Arc;

use http::{HeaderValue, Request};
use requestid_core::IdGenerator;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::warn;

/// [`MakeRequestId`] implementation backed by an [`IdGenerator`].
///
/// Empty or unencodable identifiers produce no request id, in which case
/// `SetRequestIdLayer` leaves the request untouched.
#[derive(Clone)]
pub struct MakeRequestIdWith {
    generator: Arc<dyn IdGenerator>,
}

impl MakeRequestIdWith {
    #[must_use]
    pub fn new(generator: Arc<dyn IdGenerator>) -> Self {
        Self { generator }
    }
}

impl MakeRequestId for MakeRequestIdWith {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = match self.generator.generate() {
            Ok(id) if !id.is_empty() => id,
            Ok(_) => return None,
            Err(error) => {
                warn!(%error, "request id generation failed");
                return None;
            }
        };
        HeaderValue::from_str(id.as_str()).ok().map(RequestId::new)
    }
}
