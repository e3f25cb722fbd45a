//! Shared helpers for integration tests: raw HTTP clients, server spawning,
//! and a canned-JSON mock of the prize Data Source.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use contentd::exec::files::FileAnalyzer;
use contentd::exec::nobel::NobelApi;
use contentd::listener::{HttpListener, StopHandle};
use contentd::server::ContentServer;

/// A parsed response from a raw HTTP exchange
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Send one raw request and read the full response (servers close per
/// request, so reading to EOF is the framing).
pub async fn raw_request(addr: SocketAddr, request: &str) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write failed");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read failed");
    parse_response(&String::from_utf8_lossy(&raw))
}

/// Convenience GET against a running server
pub async fn http_get(addr: SocketAddr, path: &str) -> RawResponse {
    let request = format!("GET {path} HTTP/1.1\r\nHost: test\r\n\r\n");
    raw_request(addr, &request).await
}

fn parse_response(raw: &str) -> RawResponse {
    let (head, body) = raw
        .split_once("\r\n\r\n")
        .unwrap_or_else(|| panic!("response has no header/body separator: {raw:?}"));

    let mut lines = head.lines();
    let status_line = lines.next().expect("response has no status line");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("unparseable status line: {status_line:?}"));

    let content_type = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.trim().to_string());

    RawResponse {
        status,
        content_type,
        body: body.to_string(),
    }
}

/// A content server running on an ephemeral port
pub struct RunningServer {
    pub addr: SocketAddr,
    pub stop: StopHandle,
    pub server: Arc<ContentServer>,
    pub task: JoinHandle<()>,
}

async fn spawn(server: ContentServer) -> RunningServer {
    let listener = HttpListener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr();
    let stop = listener.stop_handle();

    let server = Arc::new(server);
    let task = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.run(listener).await })
    };

    RunningServer {
        addr,
        stop,
        server,
        task,
    }
}

/// Start a file-analysis server over `root`
pub async fn spawn_files_server(root: &std::path::Path) -> RunningServer {
    let analyzer = FileAnalyzer::new(root)
        .await
        .expect("failed to create analyzer");
    spawn(ContentServer::file_analysis(analyzer)).await
}

/// Start an aggregation server pointed at `api_url`
pub async fn spawn_nobel_server(api_url: &str) -> RunningServer {
    let source = NobelApi::new(api_url).expect("failed to build data source client");
    spawn(ContentServer::nobel_aggregation(Arc::new(source))).await
}

/// Spawn a mock Data Source that answers every request with the given
/// status and JSON body. Returns its base URL.
pub fn spawn_data_source(status: u16, json: &str) -> (String, JoinHandle<()>) {
    let json = json.to_string();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock data source");
    listener.set_nonblocking(true).expect("nonblocking");
    let addr = listener.local_addr().expect("local addr");

    let task = tokio::spawn(async move {
        let listener = TcpListener::from_std(listener).expect("tokio listener");
        while let Ok((mut stream, _)) = listener.accept().await {
            let json = json.clone();
            tokio::spawn(async move {
                // Drain the request head before answering.
                let mut buffer = [0u8; 4096];
                let _ = stream.read(&mut buffer).await;

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{json}",
                    json.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), task)
}
