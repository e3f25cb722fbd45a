//! Tokio runtime selection and shutdown signal handling for the binaries

use anyhow::Result;
use tokio::signal;
use tracing::info;

/// Runtime sizing derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    worker_threads: usize,
}

impl RuntimeConfig {
    /// Build from a configured thread count.
    ///
    /// `0` means one worker per CPU core; `1` selects the current-thread
    /// runtime.
    #[must_use]
    pub fn from_threads(threads: usize) -> Self {
        let worker_threads = if threads == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1)
        } else {
            threads
        };
        Self { worker_threads }
    }

    /// Number of worker threads the runtime will use
    #[must_use]
    pub const fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Whether the current-thread runtime will be used
    #[must_use]
    pub const fn is_single_threaded(&self) -> bool {
        self.worker_threads == 1
    }

    /// Build the tokio runtime for this configuration.
    pub fn build_runtime(self) -> Result<tokio::runtime::Runtime> {
        let runtime = if self.is_single_threaded() {
            info!("starting with single-threaded runtime");
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
        } else {
            info!("starting with {} worker threads", self.worker_threads);
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(self.worker_threads)
                .enable_all()
                .build()?
        };
        Ok(runtime)
    }
}

/// Resolve when ctrl-c (or SIGTERM on unix) is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
