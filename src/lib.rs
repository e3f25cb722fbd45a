//! contentd — a small family of concurrent caching HTTP content servers.
//!
//! Each server accepts GET requests, resolves them to a unit of derived work
//! (analyze a text file for palindromes, or aggregate Nobel Prize data over a
//! year range), caches the result keyed by the request's identifying
//! parameters, and serves cached results on repeat requests.
//!
//! The pipeline is the same for every flavor:
//!
//! ```text
//! listener -> ingestion loop -> dispatcher -> route -> cache lookup
//!          -> (hit -> respond) | (miss -> executor -> cache store -> respond)
//! ```
//!
//! The ingestion loop keeps accepting indefinitely despite transient accept
//! failures; only a deliberate [`listener::StopHandle::stop`] ends it.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
pub mod formatting;
pub mod http;
pub mod listener;
pub mod logging;
pub mod route;
pub mod runtime;
pub mod server;
pub mod types;

pub use cache::{CacheStats, ResultCache};
pub use config::{create_default_config, load_config, Config};
pub use error::{AcceptError, RequestError};
pub use listener::{HttpListener, ListenerState, StopHandle};
pub use route::Routes;
pub use server::ContentServer;
pub use types::{ContentKind, Outcome, Status, WorkKey};
