//! Tower middleware for request-ID injection.
//!
//! - [`layer`]: `RequestIdLayer` running the identifier pipeline per request
//! - [`stack`]: Composes the request-ID and tracing layers
//! - [`make_request_id`]: Adapter for `tower-http`'s `SetRequestIdLayer`

pub mod layer;
pub mod make_request_id;
pub mod stack;

pub use layer::{RequestIdLayer, RequestIdService};
pub use make_request_id::MakeRequestIdWith;
pub use stack::{build_http_layers, RequestIdSpan};
