//! Core value types shared by the pipeline

use std::fmt;

use crate::error::RequestError;

/// Canonical cache key derived from a request's identifying parameters.
///
/// Derivation is a pure function of the request: equal inputs always produce
/// an equal key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkKey {
    /// File analysis: the requested filename, leading slash stripped
    File(String),
    /// External aggregation: inclusive year bounds, kept as the raw query
    /// strings (they are forwarded to the data source verbatim)
    YearRange { from: String, to: String },
}

impl fmt::Display for WorkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(name) => write!(f, "file:{name}"),
            Self::YearRange { from, to } => write!(f, "years:{from}-{to}"),
        }
    }
}

/// Status category of a computed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    ServerError,
}

impl Status {
    /// HTTP status code for this category
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::ServerError => 500,
        }
    }

    /// Reason phrase sent on the status line
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::ServerError => "Internal Server Error",
        }
    }
}

/// Body content kind; both are served as UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Plain,
    Html,
}

impl ContentKind {
    /// MIME type sent in the Content-Type header
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Plain => "text/plain; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
        }
    }
}

/// Computed outcome for a work key: what gets cached on success and what
/// gets rendered onto the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub body: String,
    pub kind: ContentKind,
}

impl Outcome {
    /// Successful outcome with the given body
    pub fn ok(body: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            status: Status::Ok,
            body: body.into(),
            kind,
        }
    }

    /// True when this outcome came from a successful computation and is
    /// therefore eligible for caching
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, Status::Ok)
    }
}

impl From<RequestError> for Outcome {
    /// Dispatcher-boundary conversion of a pipeline error into the response
    /// that will be written for it.
    ///
    /// Upstream causes are rendered human-readable (`{:#}` walks the context
    /// chain) without any backtrace or internal diagnostic detail.
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::BadRequest(msg) => Self {
                status: Status::BadRequest,
                body: msg,
                kind: ContentKind::Plain,
            },
            RequestError::NotFound(msg) => Self {
                status: Status::NotFound,
                body: msg,
                kind: ContentKind::Plain,
            },
            RequestError::Upstream(cause) => Self {
                status: Status::ServerError,
                body: format!("Server error while handling the request: {cause:#}"),
                kind: ContentKind::Plain,
            },
        }
    }
}
