//! Request ID core — pluggable identifier generation, extraction, storage, and exposure.
//!
//! A [`RequestIdInjector`] composes four strategies ([`IdSource`],
//! [`IdGenerator`], [`IdSaveHandler`], [`IdPostProcessor`]) into a single
//! per-request step over `http` types. Unset strategies default to the
//! [`DEFAULT_ID_HEADER`] header and the timestamp generator.

pub mod context;
pub mod error;
pub mod generator;
pub mod injector;
pub mod post_process;
pub mod save;
pub mod source;
pub mod traits;
pub mod types;

use http::header::HeaderName;
use http::{HeaderMap, Request};

pub use context::RequestScope;
pub use error::IdError;
pub use generator::{
    ClockSource, EntropySource, OsEntropy, RandomIdGenerator, SystemClock, TimestampIdGenerator,
    UuidIdGenerator,
};
pub use injector::{InjectorOptions, RequestIdInjector};
pub use post_process::{FnPostProcessor, HeaderPostProcessor};
pub use save::{ContextSaveHandler, FnSaveHandler, HeaderSaveHandler};
pub use source::{FnSource, HeaderSource};
pub use traits::{IdGenerator, IdPostProcessor, IdSaveHandler, IdSource};
pub use types::{RequestId, ResponseWriter};

/// Header used by the default source, save handler, and post-processor.
/// Sent on the wire as `X-Command-ID`; header names are case-insensitive.
pub const DEFAULT_ID_HEADER: HeaderName = HeaderName::from_static("x-command-id");

/// Reads the identifier from a request's [`DEFAULT_ID_HEADER`].
///
/// Independent of any injector instance: works wherever the default header
/// save handler has run (or the client supplied the header itself).
#[must_use]
pub fn request_id<B>(request: &Request<B>) -> Option<&str> {
    request_id_from_headers(request.headers())
}

/// Reads the identifier from the [`DEFAULT_ID_HEADER`] entry of `headers`.
#[must_use]
pub fn request_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(DEFAULT_ID_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
}
