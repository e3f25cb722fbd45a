//! Minimal HTTP/1.x framing: request-head parsing and one-shot response writing
//!
//! Only what the content servers need: GET requests carrying a path and a
//! query string. Request bodies are neither read nor expected, and headers
//! beyond the request line are consumed and discarded. Full HTTP semantics
//! are deliberately out of scope.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tracing::debug;

use crate::constants;
use crate::types::Outcome;

/// An accepted HTTP request, immutable after parsing.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    query: HashMap<String, String>,
    peer: SocketAddr,
}

impl Request {
    /// Build a request directly from its parts (used by the parser and tests)
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        query: HashMap<String, String>,
        peer: SocketAddr,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query,
            peer,
        }
    }

    /// Request method exactly as the client sent it
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Target path with the leading slash preserved (`"/"` for the bare root)
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value seen for a query parameter, if present
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Remote peer identity
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

/// Read and parse a request head from the client.
///
/// Lenient by design: a malformed request line still yields a `Request`
/// carrying whatever token appeared in the method position, so routing, not
/// framing, decides the client-visible error. Only I/O failures and
/// oversized heads error out.
pub(crate) async fn read_request_head<R>(reader: &mut R, peer: SocketAddr) -> Result<Request>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .await
        .context("reading request line")?;
    if n == 0 {
        bail!("client closed the connection before sending a request");
    }
    if line.len() > constants::request::LINE_MAX {
        bail!(
            "request line exceeds {} bytes",
            constants::request::LINE_MAX
        );
    }

    // Drain headers until the blank line; their contents are not used.
    let mut header = String::new();
    for _ in 0..constants::request::HEADER_MAX {
        header.clear();
        let n = reader
            .read_line(&mut header)
            .await
            .context("reading request headers")?;
        if n == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or("/");
    let (path, query) = match target.split_once('?') {
        Some((path, raw)) => (path, parse_query(raw)),
        None => (target, HashMap::new()),
    };

    Ok(Request::new(method, path, query, peer))
}

/// Parse a raw query string into a first-wins flat map.
fn parse_query(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }
    params
}

/// One-shot writer for the response side of an accepted connection.
///
/// `send` consumes the writer, making the exactly-once write a type-level
/// guarantee: every exit path either sends one response or drops the writer,
/// and dropping the write half closes the stream.
#[derive(Debug)]
pub struct ResponseWriter {
    writer: OwnedWriteHalf,
    peer: SocketAddr,
}

impl ResponseWriter {
    pub(crate) fn new(writer: OwnedWriteHalf, peer: SocketAddr) -> Self {
        Self { writer, peer }
    }

    /// Remote peer this response will be written to
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Render the outcome onto the stream, flush, and close it.
    ///
    /// A peer that already went away is not an error: the write is skipped
    /// silently and the connection simply closes. No failure here escapes
    /// to the caller.
    pub async fn send(mut self, outcome: &Outcome) {
        let head = format!(
            "HTTP/1.1 {} {}\r\nServer: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            outcome.status.code(),
            outcome.status.reason(),
            constants::SERVER_NAME,
            outcome.kind.mime(),
            outcome.body.len(),
        );

        if let Err(e) = self.write_and_close(head.as_bytes(), outcome.body.as_bytes()).await {
            if is_peer_disconnect(&e) {
                debug!("client {} went away before the response was written", self.peer);
            } else {
                debug!("failed to write response to {}: {}", self.peer, e);
            }
        }
    }

    async fn write_and_close(&mut self, head: &[u8], body: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(head).await?;
        self.writer.write_all(body).await?;
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Classify a write failure as the peer having gone away
fn is_peer_disconnect(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}
