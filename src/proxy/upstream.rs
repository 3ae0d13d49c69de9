use anyhow::{Context, Result};
use bytes::BytesMut;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// Read size for streaming the upstream body; each read becomes one chunk.
const STREAM_BUFFER_SIZE: usize = 1024;

/// Upper bound on the upstream response head.
const MAX_HEAD_SIZE: usize = 64 * 1024;

const TRAILER_SHA256: &str = "X-Content-SHA256";
const TRAILER_LENGTH: &str = "X-Content-Length";

/// Minimal HTTP/1.1 client for the configured upstream origin.
///
/// Speaks plain TCP only and always asks the origin to close the
/// connection after one exchange, so end-of-body is unambiguous even
/// without a Content-Length.
pub struct UpstreamClient {
    base_url: url::Url,
    connect_timeout: Duration,
    request_timeout: Duration,
}

/// The parsed head of an upstream response. Lenient by design: the origin
/// is configured, trusted glue, not an untrusted peer, so header lines
/// that do not parse are skipped rather than fatal.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: Headers,
}

impl UpstreamClient {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let base_url = url::Url::parse(&config.base_url).context("Invalid upstream base URL")?;
        base_url.host_str().context("Upstream URL missing host")?;

        Ok(Self {
            base_url,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Joins a proxied suffix onto the base URL's path.
    pub fn request_path(&self, suffix: &str) -> String {
        let base = self.base_url.path().trim_end_matches('/');

        let mut path = String::from(base);
        if suffix.is_empty() {
            path.push('/');
        } else if suffix.starts_with('/') {
            path.push_str(suffix);
        } else {
            path.push('/');
            path.push_str(suffix);
        }

        if path.is_empty() { "/".to_string() } else { path }
    }

    fn host_header(&self) -> String {
        // host presence is checked at construction
        let host = self.base_url.host_str().unwrap_or_default();
        match self.base_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Serializes the forwarded request.
    ///
    /// Note: this method is made public for integration testing purposes
    pub fn build_request_bytes(&self, path: &str) -> Vec<u8> {
        let mut buffer = Vec::new();

        buffer.extend_from_slice(format!("GET {} HTTP/1.1\r\n", path).as_bytes());
        buffer.extend_from_slice(format!("Host: {}\r\n", self.host_header()).as_bytes());
        buffer.extend_from_slice(b"Connection: close\r\n");
        buffer.extend_from_slice(b"Accept: */*\r\n");
        buffer.extend_from_slice(b"\r\n");

        buffer
    }

    async fn connect(&self) -> Result<TcpStream> {
        let host = self.base_url.host_str().context("Upstream URL missing host")?;
        let port = self.base_url.port().unwrap_or(80);

        let addr = format!("{}:{}", host, port);
        let stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .context("Connection timeout")?
            .context("Failed to connect to upstream")?;

        debug!(upstream = %addr, "connected to upstream");
        Ok(stream)
    }

    /// Sends the request and reads the response head.
    ///
    /// Returns the parsed head, the open stream and whatever body bytes
    /// arrived in the same reads as the head; the caller streams the rest.
    pub async fn fetch(&self, suffix: &str) -> Result<(UpstreamResponse, TcpStream, BytesMut)> {
        let mut stream = self.connect().await?;

        let path = self.request_path(suffix);
        let request_bytes = self.build_request_bytes(&path);

        let (response, leftover) = timeout(self.request_timeout, exchange(&mut stream, &request_bytes))
            .await
            .context("Request timeout")??;

        Ok((response, stream, leftover))
    }
}

/// Writes the serialized request and reads back the response head,
/// returning any body bytes that arrived with it.
async fn exchange(
    stream: &mut TcpStream,
    request_bytes: &[u8],
) -> Result<(UpstreamResponse, BytesMut)> {
    stream.write_all(request_bytes).await?;
    stream.flush().await?;

    let mut buffer = BytesMut::with_capacity(STREAM_BUFFER_SIZE);
    loop {
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            anyhow::bail!("Upstream closed before a complete response head");
        }

        if let Some(head_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = buffer.split_to(head_end + 4);
            let response = UpstreamResponse::parse(&head)?;
            return Ok((response, buffer));
        }

        if buffer.len() > MAX_HEAD_SIZE {
            anyhow::bail!("Upstream response head too large");
        }
    }
}

impl UpstreamResponse {
    /// Parses a response head (status line through the blank line).
    ///
    /// Note: this method is made public for integration testing purposes
    pub fn parse(head: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(head).context("Invalid UTF-8 in upstream response head")?;
        let mut lines = text.lines();

        let status_line = lines.next().context("Empty upstream response")?;
        let mut parts = status_line.splitn(3, ' ');
        parts.next().context("Malformed upstream status line")?;
        let code: u16 = parts
            .next()
            .context("Malformed upstream status line")?
            .parse()
            .context("Invalid upstream status code")?;

        let mut headers = Headers::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.set(name.trim(), value.trim());
            }
        }

        Ok(Self {
            status: StatusCode(code),
            headers,
        })
    }
}

/// Proxies one request: fetches from the origin and streams the body back
/// as a chunked response.
///
/// While chunks flow through, a running SHA-256 and a byte count follow
/// them; both are emitted as trailers once the terminating chunk is out,
/// so the peer can verify exactly what was relayed. An upstream failure
/// before anything was written surfaces as a 500; a failure mid-stream
/// aborts the connection, which the peer sees as a truncated chunked body.
pub async fn serve_proxied<W>(
    writer: &mut ResponseWriter<W>,
    request: &Request,
    config: &UpstreamConfig,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let suffix = request
        .target
        .strip_prefix(config.route_prefix.as_str())
        .unwrap_or("");

    let client = match UpstreamClient::from_config(config) {
        Ok(client) => client,
        Err(e) => return fail_before_stream(writer, e).await,
    };

    let (head, mut stream, leftover) = match client.fetch(suffix).await {
        Ok(parts) => parts,
        Err(e) => return fail_before_stream(writer, e).await,
    };

    let declared = head
        .headers
        .get("content-length")
        .and_then(|v| v.trim().parse::<usize>().ok());

    writer.status = head.status;
    writer.chunked = true;
    writer.headers.remove("content-length");
    writer.headers.set("transfer-encoding", "chunked");
    writer
        .headers
        .set("trailer", format!("{}, {}", TRAILER_SHA256, TRAILER_LENGTH));
    if let Some(content_type) = head.headers.get("content-type") {
        writer.headers.set("content-type", content_type);
    }

    writer.write_status_line().await?;
    writer.write_headers().await?;

    let mut hasher = Sha256::new();
    let mut total = 0usize;
    let mut remaining = declared;

    if !leftover.is_empty() {
        let take = bounded(leftover.len(), remaining);
        let chunk = &leftover[..take];
        hasher.update(chunk);
        total += take;
        writer.write_chunked_body(chunk).await?;
        consume_remaining(&mut remaining, take);
    }

    let mut buf = [0u8; STREAM_BUFFER_SIZE];
    while remaining != Some(0) {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }

        let take = bounded(n, remaining);
        let chunk = &buf[..take];
        hasher.update(chunk);
        total += take;
        writer.write_chunked_body(chunk).await?;
        consume_remaining(&mut remaining, take);
    }

    writer.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set(TRAILER_SHA256, hex::encode(hasher.finalize()));
    trailers.set(TRAILER_LENGTH, total.to_string());
    writer.write_trailers(&trailers).await?;

    debug!(bytes = total, "proxied upstream body");
    Ok(())
}

/// Error surface for failures that happen before the status line went
/// out: the writer is still pristine, so a 500 can be sent in its place.
async fn fail_before_stream<W>(writer: &mut ResponseWriter<W>, error: anyhow::Error) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    warn!(error = %error, "upstream request failed");

    writer.status = StatusCode::INTERNAL_SERVER_ERROR;
    writer.headers.set("content-type", "text/plain");
    writer.write_str("Upstream error\n");
    writer.write_response().await?;
    Ok(())
}

fn bounded(available: usize, remaining: Option<usize>) -> usize {
    match remaining {
        Some(r) => available.min(r),
        None => available,
    }
}

fn consume_remaining(remaining: &mut Option<usize>, taken: usize) {
    if let Some(r) = remaining.as_mut() {
        *r -= taken;
    }
}
