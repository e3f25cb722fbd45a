//! Listener adapter: TCP accept, request-head framing, and stop signalling
//!
//! Wraps the raw [`tokio::net::TcpListener`] behind the accept/stop contract
//! the ingestion loop relies on. `accept` hands back a parsed [`Request`]
//! together with the [`ResponseWriter`] for its connection; `stop` (through a
//! cloneable [`StopHandle`]) unblocks any pending accept with the
//! distinguished Stopped condition.
//!
//! Heads are framed on per-connection tasks, so a client that stalls halfway
//! through its request never delays the next TCP accept.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::constants;
use crate::error::AcceptError;
use crate::http::{self, Request, ResponseWriter};

/// Listener lifecycle: `bind` enters Listening, `stop` requests Stopping,
/// and the accept path observing the request settles at Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Listening,
    Stopping,
    Stopped,
}

const STATE_LISTENING: u8 = 0;
const STATE_STOPPING: u8 = 1;
const STATE_STOPPED: u8 = 2;

/// Framed requests ready for pickup but not yet accepted
const READY_QUEUE_DEPTH: usize = 64;

/// Cloneable handle that stops a running [`HttpListener`].
///
/// Idempotent: the first `stop` wins, later calls are no-ops.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop_tx: Arc<watch::Sender<bool>>,
    state: Arc<AtomicU8>,
}

impl StopHandle {
    /// Request shutdown. A blocked or future `accept` returns
    /// [`AcceptError::Stopped`] promptly.
    pub fn stop(&self) {
        if !self.stop_tx.send_replace(true) {
            let _ = self.state.compare_exchange(
                STATE_LISTENING,
                STATE_STOPPING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
            debug!("listener stop requested");
        }
    }

    /// Whether a stop has been requested
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }
}

/// HTTP listener adapter over a bound TCP socket.
pub struct HttpListener {
    inner: TcpListener,
    local_addr: SocketAddr,
    ready_tx: mpsc::Sender<(Request, ResponseWriter)>,
    ready_rx: mpsc::Receiver<(Request, ResponseWriter)>,
    stop_rx: watch::Receiver<bool>,
    stop: StopHandle,
    state: Arc<AtomicU8>,
}

impl HttpListener {
    /// Bind `addr` and begin listening.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let inner = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        let local_addr = inner.local_addr().context("resolving bound address")?;
        info!("listening on http://{}", local_addr);

        let (ready_tx, ready_rx) = mpsc::channel(READY_QUEUE_DEPTH);
        let (stop_tx, stop_rx) = watch::channel(false);
        let state = Arc::new(AtomicU8::new(STATE_LISTENING));
        let stop = StopHandle {
            stop_tx: Arc::new(stop_tx),
            state: Arc::clone(&state),
        };

        Ok(Self {
            inner,
            local_addr,
            ready_tx,
            ready_rx,
            stop_rx,
            stop,
            state,
        })
    }

    /// Address the listener is actually bound to (useful with port 0)
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle for stopping this listener from elsewhere
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ListenerState {
        match self.state.load(Ordering::SeqCst) {
            STATE_STOPPING => ListenerState::Stopping,
            STATE_STOPPED => ListenerState::Stopped,
            _ => ListenerState::Listening,
        }
    }

    /// Accept the next request.
    ///
    /// Suspends until some client's request head has been framed, or until
    /// `stop` flips the listener into shutdown. Connections that die or
    /// stall before delivering a complete head are skipped rather than
    /// surfaced; only socket-level accept failures become
    /// [`AcceptError::Io`].
    pub async fn accept(&mut self) -> Result<(Request, ResponseWriter), AcceptError> {
        loop {
            let mut stop_rx = self.stop_rx.clone();
            if *stop_rx.borrow_and_update() {
                return Err(self.mark_stopped());
            }

            tokio::select! {
                _ = stop_rx.changed() => return Err(self.mark_stopped()),
                ready = self.ready_rx.recv() => {
                    // self also holds a sender, so the channel never closes
                    if let Some(pair) = ready {
                        return Ok(pair);
                    }
                }
                accepted = self.inner.accept() => {
                    let (stream, peer) = accepted?;
                    let ready_tx = self.ready_tx.clone();
                    tokio::spawn(async move {
                        match frame(stream, peer).await {
                            Ok(pair) => {
                                let _ = ready_tx.send(pair).await;
                            }
                            Err(e) => debug!("dropping connection from {}: {:#}", peer, e),
                        }
                    });
                }
            }
        }
    }

    fn mark_stopped(&self) -> AcceptError {
        self.state.store(STATE_STOPPED, Ordering::SeqCst);
        debug!("listener on {} stopped", self.local_addr);
        AcceptError::Stopped
    }
}

/// Split the connection and read its request head under a timeout.
async fn frame(stream: TcpStream, peer: SocketAddr) -> Result<(Request, ResponseWriter)> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let request = timeout(
        constants::HEAD_READ_TIMEOUT,
        http::read_request_head(&mut reader, peer),
    )
    .await
    .context("timed out reading request head")??;
    Ok((request, ResponseWriter::new(write_half, peer)))
}
