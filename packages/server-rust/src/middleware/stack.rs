//! HTTP middleware stack for request-ID injection.
//!
//! Middleware ordering follows the outer-to-inner convention: the first
//! layer listed is the outermost (processes the request first on the way
//! in, and the response last on the way out).

use http::header::HeaderName;
use http::Request;
use requestid_core::RequestId;
use tower::ServiceBuilder;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{MakeSpan, TraceLayer};
use tracing::Span;

use super::layer::RequestIdLayer;
use crate::config::{ConfigError, RequestIdConfig};

/// The composed Tower layer type produced by [`build_http_layers`].
type HttpLayers = tower::layer::util::Stack<
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestIdSpan>,
    tower::layer::util::Stack<RequestIdLayer, tower::layer::util::Identity>,
>;

/// Builds the HTTP-level Tower middleware stack from the request-ID configuration.
///
/// **Middleware ordering (outermost to innermost):**
/// 1. `RequestId` -- resolves the identifier, saves it, stages the response header
/// 2. `Tracing` -- opens a request span carrying the resolved identifier
///
/// # Errors
///
/// Returns [`ConfigError`] if the configured header name is invalid.
pub fn build_http_layers(config: &RequestIdConfig) -> Result<HttpLayers, ConfigError> {
    let header = config.header_name()?;

    Ok(ServiceBuilder::new()
        .layer(RequestIdLayer::from_config(config)?)
        .layer(TraceLayer::new_for_http().make_span_with(RequestIdSpan::new(header)))
        .into_inner())
}

/// Creates a `http-request` span tagged with the resolved request identifier.
///
/// Runs inside [`RequestIdLayer`], which inserts the resolved [`RequestId`]
/// into the request extensions. The configured header is read only when no
/// such extension exists, i.e. when the span is used without that layer.
#[derive(Debug, Clone)]
pub struct RequestIdSpan {
    header: HeaderName,
}

impl RequestIdSpan {
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl<B> MakeSpan<B> for RequestIdSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = match request.extensions().get::<RequestId>() {
            Some(id) => id.as_str(),
            None => request
                .headers()
                .get(&self.header)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default(),
        };

        tracing::info_span!(
            "http-request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}
