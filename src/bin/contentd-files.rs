//! File-analysis content server: `GET /<filename>` reports the palindrome
//! word count of the first matching file under the configured root tree.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use contentd::config::{load_or_create_config, Config};
use contentd::exec::files::FileAnalyzer;
use contentd::listener::HttpListener;
use contentd::runtime::{self, RuntimeConfig};
use contentd::server::ContentServer;
use contentd::logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Caching palindrome-analysis HTTP server")]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "CONTENTD_FILES_PORT")]
    port: Option<u16>,

    /// Root directory searched for requested files (overrides the config file)
    #[arg(short, long, env = "CONTENTD_FILES_ROOT")]
    root: Option<String>,

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
    let root = args.root.unwrap_or(config.files.root_dir);

    let analyzer = FileAnalyzer::new(&root).await?;
    info!(
        "serving palindrome analysis for files under {}",
        analyzer.root().display()
    );

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

    let server = Arc::new(ContentServer::file_analysis(analyzer));
    server.run(listener).await;
    info!("server stopped");
    Ok(())
}
