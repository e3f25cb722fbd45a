//! Aggregation content server: `GET /nobel?fromYear=YYYY&toYear=YYYY`
//! reports the mean adjusted prize amount and the laureates for the range.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use contentd::config::{load_or_create_config, Config};
use contentd::exec::nobel::NobelApi;
use contentd::listener::HttpListener;
use contentd::logging;
use contentd::runtime::{self, RuntimeConfig};
use contentd::server::ContentServer;

#[derive(Parser, Debug)]
#[command(author, version, about = "Caching Nobel Prize aggregation HTTP server")]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "CONTENTD_NOBEL_PORT")]
    port: Option<u16>,

    /// Data Source endpoint (overrides the config file)
    #[arg(short, long, env = "CONTENTD_NOBEL_API_URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "contentd.toml", env = "CONTENTD_CONFIG")]
    config: String,
}

fn main() -> Result<()> {
    logging::init_dual_logging();
    let args = Args::parse();
    let config = load_or_create_config(&args.config)?;

    let runtime = RuntimeConfig::from_threads(config.server.threads).build_runtime()?;
    runtime.block_on(run(args, config))
}

async fn run(args: Args, config: Config) -> Result<()> {
    let port = args.port.unwrap_or(config.server.port);
    let api_url = args.api_url.unwrap_or(config.nobel.api_url);

    let source = NobelApi::new(api_url)?;
    info!("aggregating prize data from {}", source.base_url());

    let addr: SocketAddr = format!("{}:{}", config.server.host, port)
        .parse()
        .context("invalid listen address")?;
    let listener = HttpListener::bind(addr).await?;
    let stop = listener.stop_handle();

    tokio::spawn(async move {
        runtime::shutdown_signal().await;
        info!("shutdown signal received, stopping listener");
        stop.stop();
    });

    let server = Arc::new(ContentServer::nobel_aggregation(Arc::new(source)));
    server.run(listener).await;
    info!("server stopped");
    Ok(())
}
