//! Demo HTTP server with request-ID injection.
//!
//! `GET /` responds with the identifier the handler observed; the same value
//! is returned in the configured response header.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::request::Parts;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use requestid_core::{RequestId, RequestScope};
use requestid_server::{
    build_http_layers, init_tracing, GeneratorKind, LogFormat, RequestIdConfig, SaveTarget,
};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "requestid-demo", about = "Demo server for request-ID injection")]
struct Args {
    /// Bind address.
    #[arg(long, env = "REQUESTID_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Port to listen on. 0 means OS-assigned.
    #[arg(long, env = "REQUESTID_PORT", default_value_t = 8080)]
    port: u16,
    /// Header carrying the request identifier.
    #[arg(long, env = "REQUESTID_HEADER", default_value = "X-Command-ID")]
    header: String,
    #[arg(long, env = "REQUESTID_GENERATOR", value_enum, default_value_t = GeneratorKind::Timestamp)]
    generator: GeneratorKind,
    /// Ignore identifiers supplied by clients.
    #[arg(long, env = "REQUESTID_IGNORE_INBOUND")]
    ignore_inbound: bool,
    #[arg(long, env = "REQUESTID_SAVE_TO", value_enum, default_value_t = SaveTarget::Header)]
    save_to: SaveTarget,
    #[arg(long, env = "REQUESTID_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Args {
    fn request_id_config(&self) -> RequestIdConfig {
        RequestIdConfig {
            header: self.header.clone(),
            generator: self.generator,
            trust_inbound: !self.ignore_inbound,
            save_to: self.save_to,
            ..RequestIdConfig::default()
        }
    }
}

async fn show_request_id(State(config): State<RequestIdConfig>, parts: Parts) -> String {
    let id = match config.save_to {
        SaveTarget::Header => parts
            .headers
            .get(config.header.as_str())
            .and_then(|value| value.to_str().ok()),
        SaveTarget::Context => {
            RequestScope::id(&parts.extensions, &config.context_key).map(RequestId::as_str)
        }
    };
    id.unwrap_or_default().to_string()
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format)?;

    let config = args.request_id_config();
    let layers = build_http_layers(&config)?;

    let app = Router::new()
        .route("/", get(show_request_id))
        .layer(layers)
        .with_state(config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "request-id demo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
