use std::io;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::sync::Arc;

use anyhow::Context;
use docquiz::{api, config, logging, processing::QuizPipeline};
use tokio::net::TcpListener;

/// Ports tried in order when `SERVER_PORT` is unset.
const FALLBACK_PORTS: RangeInclusive<u16> = 8000..=8099;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    let pipeline =
        QuizPipeline::from_config(config).context("failed to initialize model clients")?;
    let app = api::create_router(Arc::new(pipeline), config.max_upload_bytes);

    let listener = bind_listener(config.server_port).await?;
    let address = listener.local_addr()?;
    tracing::info!(%address, provider = ?config.model_provider, "docquiz listening");
    axum::serve(listener, app).await.context("server terminated")
}

/// Bind the configured port, or the first free port of [`FALLBACK_PORTS`].
///
/// An explicitly configured port is never substituted.
async fn bind_listener(configured: Option<u16>) -> anyhow::Result<TcpListener> {
    let candidates: Vec<u16> = match configured {
        Some(port) => vec![port],
        None => FALLBACK_PORTS.collect(),
    };

    for port in candidates {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => return Ok(listener),
            Err(error) if error.kind() == io::ErrorKind::AddrInUse && configured.is_none() => {
                tracing::debug!(port, "port busy");
            }
            Err(error) => {
                return Err(error).with_context(|| format!("failed to bind port {port}"));
            }
        }
    }

    anyhow::bail!(
        "no free port between {} and {}",
        FALLBACK_PORTS.start(),
        FALLBACK_PORTS.end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn configured_port_in_use_is_an_error() {
        let held = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .expect("ephemeral port");
        let port = held.local_addr().expect("local addr").port();

        assert!(bind_listener(Some(port)).await.is_err());
    }

    #[tokio::test]
    async fn configured_free_port_is_bound_exactly() {
        let reserved = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .expect("ephemeral port");
        let port = reserved.local_addr().expect("local addr").port();
        drop(reserved);

        let listener = bind_listener(Some(port)).await.expect("bind");
        assert_eq!(listener.local_addr().expect("local addr").port(), port);
    }
}
