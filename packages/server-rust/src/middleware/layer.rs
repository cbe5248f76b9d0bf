//! Tower middleware that runs the request-ID pipeline for every HTTP request.
//!
//! The post-processor runs before the inner service produces a response, so
//! the headers it writes are staged in a `HeaderMap` and applied to the real
//! response once the inner future resolves.
//!
//! The resolved [`RequestId`](requestid_core::RequestId) is also inserted
//! into the request extensions, so inner layers and handlers can read it
//! whichever save handler is configured.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{HeaderMap, Request, Response};
use requestid_core::{InjectorOptions, RequestIdInjector};
use tower::{Layer, Service};

use crate::config::{ConfigError, RequestIdConfig};

// ---------------------------------------------------------------------------
// RequestIdLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps services with [`RequestIdInjector`].
///
/// Headers written by the post-processor are applied after the inner service
/// returns and replace any value it set under the same name. This differs
/// from [`RequestIdInjector::handle`], where `next` runs last and can
/// overwrite what the post-processor wrote.
#[derive(Debug, Clone)]
pub struct RequestIdLayer {
    injector: RequestIdInjector,
}

impl RequestIdLayer {
    #[must_use]
    pub fn new(injector: RequestIdInjector) -> Self {
        Self { injector }
    }

    #[must_use]
    pub fn with_options(options: InjectorOptions) -> Self {
        Self::new(RequestIdInjector::new(options))
    }

    /// Builds the layer from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configured header name is invalid.
    pub fn from_config(config: &RequestIdConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_options(config.to_options()?))
    }
}

impl Default for RequestIdLayer {
    fn default() -> Self {
        Self::new(RequestIdInjector::default())
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService {
            inner,
            injector: self.injector.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestIdService
// ---------------------------------------------------------------------------

/// Service wrapper that resolves the request ID before calling the inner service.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
    injector: RequestIdInjector,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResBody>, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let mut staged = HeaderMap::new();
        let (mut parts, body) = request.into_parts();
        let id = self.injector.resolve(&mut parts, &mut staged);
        parts.extensions.insert(id);
        let fut = self.inner.call(Request::from_parts(parts, body));

        Box::pin(async move {
            let mut response = fut.await?;
            apply_staged_headers(response.headers_mut(), staged);
            Ok(response)
        })
    }
}

/// Copies staged headers onto the response. Each staged name replaces
/// whatever the inner service set under that name; repeated staged values
/// are kept.
fn apply_staged_headers(target: &mut HeaderMap, staged: HeaderMap) {
    let mut current = None;
    for (name, value) in staged {
        match name {
            Some(name) => {
                target.insert(name.clone(), value);
                current = Some(name);
            }
            None => {
                if let Some(name) = &current {
                    target.append(name.clone(), value);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use http::HeaderValue;
    use parking_lot::Mutex;
    use regex::Regex;
    use requestid_core::{request_id_from_headers, FnPostProcessor, RequestId, DEFAULT_ID_HEADER};
    use tower::ServiceExt;

    use super::*;

    async fn echo_request_id(headers: HeaderMap) -> String {
        request_id_from_headers(&headers).unwrap_or_default().to_string()
    }

    fn app(layer: RequestIdLayer) -> Router {
        Router::new().route("/", get(echo_request_id)).layer(layer)
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn inbound_id_is_echoed_on_response_and_visible_downstream() {
        let request = Request::builder()
            .uri("/")
            .header("X-Command-ID", "abc123")
            .body(Body::empty())
            .unwrap();

        let response = app(RequestIdLayer::default()).oneshot(request).await.unwrap();

        assert_eq!(response.headers()[DEFAULT_ID_HEADER], "abc123");
        assert_eq!(body_string(response).await, "abc123");
    }

    #[tokio::test]
    async fn missing_id_gets_timestamp_id() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app(RequestIdLayer::default()).oneshot(request).await.unwrap();

        let header = response.headers()[DEFAULT_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();
        let pattern = Regex::new(r"^\d+\.\d{6}\.[0-9a-f]{4}$").unwrap();
        assert!(pattern.is_match(&header), "unexpected id {header}");
        assert_eq!(body_string(response).await, header);
    }

    #[tokio::test]
    async fn custom_post_processor_sees_one_id_per_request() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let layer = RequestIdLayer::with_options(InjectorOptions::default().with_post_processor(
            FnPostProcessor::new(move |_, _, id| sink.lock().push(id.clone())),
        ));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app(layer).oneshot(request).await.unwrap();
        let downstream = body_string(response).await;

        let seen = seen.lock();
        assert_eq!(*seen, vec![RequestId::new(downstream)]);
    }

    #[tokio::test]
    async fn inner_service_is_called_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let inner = tower::service_fn(move |_request: Request<()>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Infallible>(Response::new(())) }
        });

        let response = RequestIdLayer::default()
            .layer(inner)
            .oneshot(Request::new(()))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(response.headers().contains_key(DEFAULT_ID_HEADER));
    }

    #[tokio::test]
    async fn resolved_id_replaces_handler_header() {
        let inner = tower::service_fn(|_request: Request<()>| async {
            let mut response = Response::new(());
            response
                .headers_mut()
                .insert(DEFAULT_ID_HEADER, HeaderValue::from_static("from-handler"));
            Ok::<_, Infallible>(response)
        });

        let request = Request::builder()
            .header("X-Command-ID", "abc123")
            .body(())
            .unwrap();
        let response = RequestIdLayer::default()
            .layer(inner)
            .oneshot(request)
            .await
            .unwrap();

        let values: Vec<_> = response.headers().get_all(DEFAULT_ID_HEADER).iter().collect();
        assert_eq!(values, vec!["abc123"]);
    }

    #[tokio::test]
    async fn resolved_id_is_inserted_into_extensions() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let inner = tower::service_fn(move |request: Request<()>| {
            *sink.lock() = request.extensions().get::<RequestId>().cloned();
            async { Ok::<_, Infallible>(Response::new(())) }
        });
        let config = RequestIdConfig {
            trust_inbound: false,
            save_to: crate::config::SaveTarget::Context,
            ..RequestIdConfig::default()
        };

        let request = Request::builder()
            .header("X-Command-ID", "client-supplied")
            .body(())
            .unwrap();
        let response = RequestIdLayer::from_config(&config)
            .unwrap()
            .layer(inner)
            .oneshot(request)
            .await
            .unwrap();

        let header = response.headers()[DEFAULT_ID_HEADER].to_str().unwrap();
        assert_ne!(header, "client-supplied");
        assert_eq!(seen.lock().as_ref().map(RequestId::as_str), Some(header));
    }

    #[tokio::test]
    async fn inner_errors_propagate() {
        let inner = tower::service_fn(|_request: Request<()>| async {
            Err::<Response<()>, _>("handler failed")
        });

        let err = RequestIdLayer::default()
            .layer(inner)
            .oneshot(Request::new(()))
            .await
            .unwrap_err();

        assert_eq!(err, "handler failed");
    }

    #[test]
    fn staged_headers_replace_and_keep_repeats() {
        let mut target = HeaderMap::new();
        target.insert("x-a", HeaderValue::from_static("old"));
        target.insert("x-keep", HeaderValue::from_static("kept"));

        let mut staged = HeaderMap::new();
        staged.append("x-a", HeaderValue::from_static("new-1"));
        staged.append("x-a", HeaderValue::from_static("new-2"));
        staged.insert("x-b", HeaderValue::from_static("b"));

        apply_staged_headers(&mut target, staged);

        let a: Vec<_> = target.get_all("x-a").iter().collect();
        assert_eq!(a, vec!["new-1", "new-2"]);
        assert_eq!(target["x-b"], "b");
        assert_eq!(target["x-keep"], "kept");
    }

    #[test]
    fn from_config_rejects_invalid_header() {
        let config = RequestIdConfig {
            header: "not a header".to_string(),
            ..RequestIdConfig::default()
        };
        assert!(RequestIdLayer::from_config(&config).is_err());
    }
}
