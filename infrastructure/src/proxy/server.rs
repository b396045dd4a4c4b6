//! Minimal HTTP/1.1 listener hosting the [`ChatProxy`].
//!
//! One request per connection: the request line, headers and a
//! `Content-Length` body are read, the handler runs, and the connection is
//! closed after the response. Chunked request bodies are not accepted.

use super::error::{ProxyError, Result};
use super::handler::{ChatProxy, ProxyResponse};
use super::upstream::ChatUpstream;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Path the chat handler is mounted on
pub const CHAT_PATH: &str = "/api/chat";

const MAX_HEAD_BYTES: usize = 16 * 1024;
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Parsed request head plus body
#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

/// Accept loop serving the proxy
pub struct ProxyServer<U: ChatUpstream + 'static> {
    listener: TcpListener,
    proxy: Arc<ChatProxy<U>>,
}

impl<U: ChatUpstream + 'static> ProxyServer<U> {
    /// Bind to `addr`
    pub async fn bind(addr: &str, proxy: ChatProxy<U>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::with_listener(listener, proxy))
    }

    /// Serve on an already bound listener
    pub fn with_listener(listener: TcpListener, proxy: ChatProxy<U>) -> Self {
        Self {
            listener,
            proxy: Arc::new(proxy),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run until the listener fails.
    pub async fn run(self) -> Result<()> {
        info!("Completion proxy listening on {}{}", self.local_addr()?, CHAT_PATH);
        loop {
            let (socket, peer) = self.listener.accept().await?;
            let proxy = Arc::clone(&self.proxy);
            tokio::spawn(async move {
                if let Err(e) = serve_connection(socket, &proxy).await {
                    warn!("Connection from {} failed: {}", peer, e);
                }
            });
        }
    }
}

async fn serve_connection<U: ChatUpstream + 'static>(
    mut socket: TcpStream,
    proxy: &ChatProxy<U>,
) -> Result<()> {
    let response = match read_request(&mut socket).await {
        Ok(request) => {
            debug!("{} {}", request.method, request.path);
            if route_matches(&request.path) {
                proxy.handle(&request.method, &request.body).await
            } else {
                ProxyResponse::json(404, json!({ "error": "Not found" }))
            }
        }
        Err(ProxyError::MalformedRequest(reason)) => {
            ProxyResponse::json(400, json!({ "error": reason }))
        }
        Err(e) => return Err(e),
    };

    socket.write_all(&encode_response(&response)).await?;
    socket.shutdown().await?;
    Ok(())
}

fn route_matches(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or_default();
    path.trim_end_matches('/') == CHAT_PATH
}

async fn read_request(socket: &mut TcpStream) -> Result<HttpRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];

    let head_end = loop {
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        if buffer.len() > MAX_HEAD_BYTES {
            return Err(ProxyError::MalformedRequest(
                "Request head too large".to_string(),
            ));
        }
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(ProxyError::MalformedRequest(
                "Connection closed before request head".to_string(),
            ));
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buffer[..head_end])
        .map_err(|_| ProxyError::MalformedRequest("Request head is not UTF-8".to_string()))?;
    let (method, path, content_length) = parse_head(head)?;
    if content_length > MAX_BODY_BYTES {
        return Err(ProxyError::MalformedRequest(
            "Request body too large".to_string(),
        ));
    }

    let mut body = buffer[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(ProxyError::MalformedRequest(
                "Connection closed before request body".to_string(),
            ));
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(HttpRequest { method, path, body })
}

fn parse_head(head: &str) -> Result<(String, String, usize)> {
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(path), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ProxyError::MalformedRequest(format!(
            "Bad request line: {:?}",
            request_line
        )));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ProxyError::MalformedRequest(format!(
            "Unsupported version: {}",
            version
        )));
    }

    let mut content_length = 0;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.trim().parse().map_err(|_| {
                ProxyError::MalformedRequest(format!("Bad Content-Length: {}", value.trim()))
            })?;
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            return Err(ProxyError::MalformedRequest(
                "Chunked request bodies are not supported".to_string(),
            ));
        }
    }

    Ok((method.to_string(), path.to_string(), content_length))
}

fn encode_response(response: &ProxyResponse) -> Vec<u8> {
    let body = response
        .body
        .as_ref()
        .map(|value| value.to_string())
        .unwrap_or_default();

    let mut out = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status,
        status_reason(response.status)
    );
    for (name, value) in &response.headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    if response.body.is_some() {
        out.push_str("Content-Type: application/json; charset=utf-8\r\n");
    }
    out.push_str(&format!("Content-Length: {}\r\n", body.len()));
    out.push_str("Connection: close\r\n\r\n");
    out.push_str(&body);
    out.into_bytes()
}

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
