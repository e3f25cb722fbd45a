//! Error taxonomy for the request pipeline and the accept loop

use thiserror::Error;

/// Errors raised inside a single request's pipeline.
///
/// Every variant maps to exactly one response status. Conversion to a
/// response happens at the dispatcher boundary, so no pipeline error can
/// reach the ingestion loop or another in-flight request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The client sent something we refuse to process (wrong method,
    /// missing or malformed identifying parameters). Maps to 400.
    #[error("{0}")]
    BadRequest(String),

    /// The route or the named resource does not exist. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// Upstream or internal failure: data source unreachable, file I/O
    /// failure, unexpected fault. Maps to 500 with a human-readable cause.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// Failure modes of [`crate::listener::HttpListener::accept`].
#[derive(Debug, Error)]
pub enum AcceptError {
    /// The listener was deliberately stopped.
    ///
    /// This is a control condition, not an operational error: it is never
    /// logged as one and never produces a response. It is the normal
    /// shutdown signal for the ingestion loop.
    #[error("listener stopped")]
    Stopped,

    /// Socket-level accept failure. The ingestion loop logs and retries.
    #[error("accept failed: {0}")]
    Io(#[from] std::io::Error),
}

impl AcceptError {
    /// True when this is the deliberate-shutdown control condition
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}
