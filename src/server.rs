//! Content server: resilient ingestion loop, dispatcher, and the per-request
//! pipeline.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::error::{AcceptError, RequestError};
use crate::exec::files::FileAnalyzer;
use crate::exec::nobel::{self, DataSource};
use crate::http::{Request, ResponseWriter};
use crate::listener::HttpListener;
use crate::route::Routes;
use crate::types::{Outcome, WorkKey};

/// The executor behind a server flavor.
enum Executor {
    Files(FileAnalyzer),
    Nobel(Arc<dyn DataSource>),
}

/// One content server: a route table, a result cache, and an executor,
/// driven by the ingestion loop in [`ContentServer::run`].
///
/// The cache is owned here and dependency-injected into nothing global;
/// every worker reaches it through the shared `Arc<ContentServer>`.
pub struct ContentServer {
    routes: Routes,
    cache: ResultCache,
    executor: Executor,
}

impl ContentServer {
    /// Build the file-analysis flavor over `analyzer`'s root tree.
    #[must_use]
    pub fn file_analysis(analyzer: FileAnalyzer) -> Self {
        Self {
            routes: Routes::FileAnalysis,
            cache: ResultCache::new(),
            executor: Executor::Files(analyzer),
        }
    }

    /// Build the aggregation flavor over the given data source.
    #[must_use]
    pub fn nobel_aggregation(source: Arc<dyn DataSource>) -> Self {
        Self {
            routes: Routes::NobelAggregation,
            cache: ResultCache::new(),
            executor: Executor::Nobel(source),
        }
    }

    /// The shared result cache (exposed for stats logging and tests)
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run the ingestion loop until the listener is stopped.
    ///
    /// Every accepted request is dispatched onto its own task immediately,
    /// so slow processing never delays the next accept. Worker fan-out is
    /// unbounded; that is an accepted limitation, not an oversight.
    /// Transient accept failures are logged and retried without bound; only
    /// the Stopped condition ends the loop.
    pub async fn run(self: Arc<Self>, mut listener: HttpListener) {
        loop {
            match listener.accept().await {
                Ok((request, responder)) => {
                    let server = Arc::clone(&self);
                    tokio::spawn(async move {
                        server.handle(request, responder).await;
                    });
                }
                Err(AcceptError::Stopped) => {
                    info!("listener stopped, ingestion loop exiting");
                    break;
                }
                Err(AcceptError::Io(e)) => {
                    warn!("accept failed, retrying: {}", e);
                }
            }
        }

        let stats = self.cache.stats();
        info!(
            hits = stats.hits,
            misses = stats.misses,
            entries = stats.entries,
            "final cache stats"
        );
    }

    /// Process one request end to end and write exactly one response.
    ///
    /// Every pipeline failure is converted to an outcome right here at the
    /// dispatcher boundary; nothing escapes to the ingestion loop or to
    /// other in-flight requests.
    async fn handle(&self, request: Request, responder: ResponseWriter) {
        info!(
            "{} {} from {}",
            request.method(),
            request.path(),
            request.peer()
        );

        let outcome = match self.process(&request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("request from {} failed: {}", request.peer(), err);
                Outcome::from(err)
            }
        };
        responder.send(&outcome).await;
    }

    /// route → cache lookup → executor → cache store
    async fn process(&self, request: &Request) -> Result<Outcome, RequestError> {
        let key = self.routes.resolve(request)?;

        if let Some(cached) = self.cache.lookup(&key) {
            debug!(key = %key, "cache hit");
            return Ok(cached);
        }
        debug!(key = %key, "cache miss, computing");

        let outcome = self.execute(&key).await?;
        // Failed computations never reach this point; only successful
        // outcomes are worth replaying to later requests.
        if outcome.is_ok() {
            self.cache.store(key, outcome.clone());
        }
        Ok(outcome)
    }

    async fn execute(&self, key: &WorkKey) -> Result<Outcome, RequestError> {
        match (&self.executor, key) {
            (Executor::Files(analyzer), WorkKey::File(name)) => analyzer.analyze(name).await,
            (Executor::Nobel(source), WorkKey::YearRange { from, to }) => {
                nobel::aggregate(source.as_ref(), from, to).await
            }
            // A route table only produces keys its own executor understands.
            _ => Err(RequestError::Upstream(anyhow::anyhow!(
                "work key {key} does not match this server's executor"
            ))),
        }
    }
}
