//! Constants shared across the content servers
//!
//! Centralizes limits and timeouts so the framing and executor code stays
//! free of magic numbers.

use std::time::Duration;

/// Limits applied while reading a request head
pub mod request {
    /// Maximum accepted request-line length in bytes
    ///
    /// Generous for a method plus path plus a short query string; anything
    /// longer is dropped at the framing layer.
    pub const LINE_MAX: usize = 8 * 1024;

    /// Maximum number of header lines read (and discarded) per request
    pub const HEADER_MAX: usize = 100;
}

/// Time allowed for a client to deliver its complete request head
///
/// Bounds how long a slow or stalled client can hold up the accept loop.
pub const HEAD_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a single Data Source call
pub const DATA_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Identity sent in the `Server` response header
pub const SERVER_NAME: &str = concat!("contentd/", env!("CARGO_PKG_VERSION"));
