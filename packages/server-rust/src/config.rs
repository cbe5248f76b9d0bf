//! Configuration types for the request-ID middleware.

use std::sync::Arc;

use http::header::{HeaderName, InvalidHeaderName};
use requestid_core::{
    ContextSaveHandler, FnSource, HeaderPostProcessor, HeaderSaveHandler, HeaderSource,
    IdGenerator, InjectorOptions, RandomIdGenerator, TimestampIdGenerator, UuidIdGenerator,
};
use serde::Deserialize;

/// Which built-in generator mints new identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// `<secs>.<micros>.<4 hex>`
    #[default]
    Timestamp,
    /// 32 lowercase hex characters.
    Random,
    /// Hyphenated UUID v4.
    Uuid,
}

impl GeneratorKind {
    #[must_use]
    pub fn build(self) -> Arc<dyn IdGenerator> {
        match self {
            Self::Timestamp => Arc::new(TimestampIdGenerator::new()),
            Self::Random => Arc::new(RandomIdGenerator::new()),
            Self::Uuid => Arc::new(UuidIdGenerator),
        }
    }
}

/// Where the resolved identifier is recorded for downstream handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SaveTarget {
    /// Request header named by [`RequestIdConfig::header`].
    #[default]
    Header,
    /// Request-scoped extension store under [`RequestIdConfig::context_key`].
    Context,
}

/// Request-ID middleware configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequestIdConfig {
    /// Header read from the request and written to the response.
    pub header: String,
    /// Generator used when the request carries no identifier.
    pub generator: GeneratorKind,
    /// Reuse identifiers supplied by the client. When `false`, every request
    /// gets a freshly generated identifier.
    pub trust_inbound: bool,
    /// Where the identifier is saved on the request.
    pub save_to: SaveTarget,
    /// Key used when `save_to` is [`SaveTarget::Context`].
    pub context_key: String,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self {
            header: "X-Command-ID".to_string(),
            generator: GeneratorKind::default(),
            trust_inbound: true,
            save_to: SaveTarget::default(),
            context_key: "request_id".to_string(),
        }
    }
}

/// Errors raised while turning configuration into middleware.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid header name {name:?}")]
    InvalidHeader {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },
}

impl RequestIdConfig {
    /// Parses the configured header name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] if `header` is not a valid header name.
    pub fn header_name(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::try_from(self.header.as_str()).map_err(|source| ConfigError::InvalidHeader {
            name: self.header.clone(),
            source,
        })
    }

    /// Builds injector options with every slot populated from this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] if `header` is not a valid header name.
    pub fn to_options(&self) -> Result<InjectorOptions, ConfigError> {
        let header = self.header_name()?;

        let mut options = InjectorOptions {
            generator: Some(self.generator.build()),
            ..InjectorOptions::default()
        };

        options = if self.trust_inbound {
            options.with_source(HeaderSource::new(header.clone()))
        } else {
            options.with_source(FnSource::new(|_| None))
        };

        options = match self.save_to {
            SaveTarget::Header => options.with_save_handler(HeaderSaveHandler::new(header.clone())),
            SaveTarget::Context => {
                options.with_save_handler(ContextSaveHandler::new(self.context_key.clone()))
            }
        };

        Ok(options.with_post_processor(HeaderPostProcessor::new(header)))
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, Request};
    use requestid_core::{RequestIdInjector, RequestScope};

    use super::*;

    #[test]
    fn request_id_config_defaults() {
        let config = RequestIdConfig::default();
        assert_eq!(config.header, "X-Command-ID");
        assert_eq!(config.generator, GeneratorKind::Timestamp);
        assert!(config.trust_inbound);
        assert_eq!(config.save_to, SaveTarget::Header);
        assert_eq!(config.context_key, "request_id");
    }

    #[test]
    fn deserializes_partial_config() {
        let config: RequestIdConfig =
            serde_json::from_str(r#"{"generator": "random", "save_to": "context"}"#).unwrap();
        assert_eq!(config.generator, GeneratorKind::Random);
        assert_eq!(config.save_to, SaveTarget::Context);
        assert_eq!(config.header, "X-Command-ID");
        assert!(config.trust_inbound);
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let config = RequestIdConfig {
            header: "bad header".to_string(),
            ..RequestIdConfig::default()
        };
        let err = config.to_options().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { .. }));
    }

    #[test]
    fn untrusted_inbound_id_is_replaced() {
        let config = RequestIdConfig {
            generator: GeneratorKind::Uuid,
            trust_inbound: false,
            ..RequestIdConfig::default()
        };
        let injector = RequestIdInjector::new(config.to_options().unwrap());

        let request = Request::builder()
            .header("X-Command-ID", "client-chosen")
            .body(())
            .unwrap();
        let mut response = HeaderMap::new();
        let request = injector.handle(request, &mut response, |req, _| req);

        let id = requestid_core::request_id(&request).unwrap();
        assert_ne!(id, "client-chosen");
        assert_eq!(id.len(), 36);
        assert_eq!(response["x-command-id"], id);
    }

    #[test]
    fn custom_header_and_context_target() {
        let config = RequestIdConfig {
            header: "X-Trace".to_string(),
            save_to: SaveTarget::Context,
            context_key: "trace".to_string(),
            ..RequestIdConfig::default()
        };
        let injector = RequestIdInjector::new(config.to_options().unwrap());

        let request = Request::builder()
            .header("X-Trace", "t-1")
            .body(())
            .unwrap();
        let mut response = HeaderMap::new();
        let request = injector.handle(request, &mut response, |req, _| req);

        assert_eq!(
            RequestScope::id(request.extensions(), "trace").map(|id| id.as_str()),
            Some("t-1")
        );
        assert_eq!(response["x-trace"], "t-1");
    }
}
