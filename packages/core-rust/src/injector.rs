//! The request-ID pipeline: source, generator, save handler, post-processor.

use std::fmt;
use std::sync::Arc;

use http::{request, Request};
use tracing::{debug, warn};

use crate::generator::TimestampIdGenerator;
use crate::post_process::HeaderPostProcessor;
use crate::save::HeaderSaveHandler;
use crate::source::HeaderSource;
use crate::traits::{IdGenerator, IdPostProcessor, IdSaveHandler, IdSource};
use crate::types::{RequestId, ResponseWriter};
use crate::DEFAULT_ID_HEADER;

// ---------------------------------------------------------------------------
// InjectorOptions
// ---------------------------------------------------------------------------

/// Strategy slots for [`RequestIdInjector`]. Unset slots receive the
/// header-based defaults (and the timestamp generator) at construction.
#[derive(Clone, Default)]
pub struct InjectorOptions {
    pub generator: Option<Arc<dyn IdGenerator>>,
    pub source: Option<Arc<dyn IdSource>>,
    pub save_handler: Option<Arc<dyn IdSaveHandler>>,
    pub post_processor: Option<Arc<dyn IdPostProcessor>>,
}

impl InjectorOptions {
    #[must_use]
    pub fn with_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl IdSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub fn with_save_handler(mut self, save_handler: impl IdSaveHandler + 'static) -> Self {
        self.save_handler = Some(Arc::new(save_handler));
        self
    }

    #[must_use]
    pub fn with_post_processor(mut self, post_processor: impl IdPostProcessor + 'static) -> Self {
        self.post_processor = Some(Arc::new(post_processor));
        self
    }
}

impl fmt::Debug for InjectorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectorOptions")
            .field("generator", &self.generator.is_some())
            .field("source", &self.source.is_some())
            .field("save_handler", &self.save_handler.is_some())
            .field("post_processor", &self.post_processor.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// RequestIdInjector
// ---------------------------------------------------------------------------

/// Resolves one identifier per request and hands the request on.
///
/// Per request:
/// 1. ask the source for an inbound identifier
/// 2. if there is none, generate one
/// 3. save it (by default onto the request header)
/// 4. post-process it (by default onto the response header)
/// 5. invoke the downstream handler exactly once
///
/// No step can abort the request. Strategy errors are logged at `warn` and
/// discarded; a failed generator leaves the identifier empty.
///
/// Bindings are fixed at construction and shared behind `Arc`, so cloning
/// the injector is cheap and it can serve concurrent requests.
#[derive(Clone)]
pub struct RequestIdInjector {
    generator: Arc<dyn IdGenerator>,
    source: Arc<dyn IdSource>,
    save_handler: Arc<dyn IdSaveHandler>,
    post_processor: Arc<dyn IdPostProcessor>,
}

impl RequestIdInjector {
    /// Builds an injector, substituting defaults for unset slots.
    #[must_use]
    pub fn new(options: InjectorOptions) -> Self {
        let InjectorOptions {
            generator,
            source,
            save_handler,
            post_processor,
        } = options;

        Self {
            generator: generator.unwrap_or_else(|| Arc::new(TimestampIdGenerator::new())),
            source: source.unwrap_or_else(|| Arc::new(HeaderSource::new(DEFAULT_ID_HEADER))),
            save_handler: save_handler
                .unwrap_or_else(|| Arc::new(HeaderSaveHandler::new(DEFAULT_ID_HEADER))),
            post_processor: post_processor
                .unwrap_or_else(|| Arc::new(HeaderPostProcessor::new(DEFAULT_ID_HEADER))),
        }
    }

    /// Resolves, saves, and post-processes the identifier for one request.
    pub fn resolve(
        &self,
        request: &mut request::Parts,
        response: &mut dyn ResponseWriter,
    ) -> RequestId {
        let id = match self.source.get_id(request).filter(|id| !id.is_empty()) {
            Some(id) => {
                debug!(request_id = %id, "using inbound request id");
                id
            }
            None => self.generate(),
        };

        if let Err(error) = self.save_handler.save_id(response, request, &id) {
            warn!(request_id = %id, %error, "failed to save request id");
        }
        if let Err(error) = self.post_processor.process(response, request, &id) {
            warn!(request_id = %id, %error, "failed to post-process request id");
        }

        id
    }

    /// Runs [`resolve`](Self::resolve) and then calls `next` exactly once
    /// with the (possibly mutated) request and response.
    pub fn handle<B, W, F, T>(&self, request: Request<B>, response: &mut W, next: F) -> T
    where
        W: ResponseWriter,
        F: FnOnce(Request<B>, &mut W) -> T,
    {
        let (mut parts, body) = request.into_parts();
        self.resolve(&mut parts, response);
        next(Request::from_parts(parts, body), response)
    }

    fn generate(&self) -> RequestId {
        match self.generator.generate() {
            Ok(id) => {
                debug!(request_id = %id, "generated request id");
                id
            }
            Err(error) => {
                warn!(%error, "request id generation failed, continuing with an empty id");
                RequestId::default()
            }
        }
    }
}

impl Default for RequestIdInjector {
    fn default() -> Self {
        Self::new(InjectorOptions::default())
    }
}

impl fmt::Debug for RequestIdInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestIdInjector").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
