//! Request ID server integration — tower layer, middleware stack, configuration, and logging.

pub mod config;
pub mod middleware;
pub mod telemetry;

pub use config::{ConfigError, GeneratorKind, RequestIdConfig, SaveTarget};
pub use middleware::{build_http_layers, MakeRequestIdWith, RequestIdLayer, RequestIdService};
pub use telemetry::{init_tracing, LogFormat};
