use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::{StatusCode, default_headers};

#[derive(Debug, Error)]
pub enum WriterError {
    /// A write method was invoked outside its required predecessor state.
    /// This is a bug in the handler, not a transport condition; nothing is
    /// written to the sink.
    #[error("{operation} called out of order")]
    OutOfOrder { operation: &'static str },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Init,
    StatusWritten,
    HeadersWritten,
    BodyWritten,
}

/// State-ordered HTTP/1.1 response writer.
///
/// Handlers stage the response (status, headers, buffered body) and the
/// emit methods put it on the wire in the only legal order:
///
/// ```text
/// Init → StatusWritten → HeadersWritten → BodyWritten
/// ```
///
/// The body step is either [`write_body`](Self::write_body) for a buffered
/// body, or any number of [`write_chunked_body`](Self::write_chunked_body)
/// calls closed by [`write_chunked_body_done`](Self::write_chunked_body_done),
/// optionally followed by [`write_trailers`](Self::write_trailers).
pub struct ResponseWriter<W> {
    sink: W,
    pub status: StatusCode,
    pub headers: Headers,
    /// Chunked callers manage their own framing headers: remove
    /// Content-Length, set Transfer-Encoding themselves.
    pub chunked: bool,
    body: Vec<u8>,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            status: StatusCode::OK,
            headers: default_headers(),
            chunked: false,
            body: Vec::new(),
            state: WriterState::Init,
        }
    }

    /// Appends to the buffered body; nothing reaches the sink until
    /// [`write_body`](Self::write_body).
    pub fn write(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }

    pub fn write_str(&mut self, s: &str) {
        self.body.extend_from_slice(s.as_bytes());
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    fn require_state(
        &self,
        expected: WriterState,
        operation: &'static str,
    ) -> Result<(), WriterError> {
        if self.state != expected {
            return Err(WriterError::OutOfOrder { operation });
        }
        Ok(())
    }

    /// Emits `HTTP/1.1 <code> <reason>` followed by CRLF.
    pub async fn write_status_line(&mut self) -> Result<(), WriterError> {
        self.require_state(WriterState::Init, "write_status_line")?;

        let line = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        self.sink.write_all(line.as_bytes()).await?;

        self.state = WriterState::StatusWritten;
        Ok(())
    }

    /// Serializes the header block and its terminating blank line.
    ///
    /// In non-chunked mode a missing Content-Length is computed from the
    /// buffered body; a value the caller set is left alone.
    pub async fn write_headers(&mut self) -> Result<(), WriterError> {
        self.require_state(WriterState::StatusWritten, "write_headers")?;

        if !self.chunked && self.headers.get("content-length").is_none() {
            self.headers.set("content-length", self.body.len().to_string());
        }

        let mut block = String::new();
        for (name, value) in self.headers.iter() {
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
            block.push_str("\r\n");
        }
        block.push_str("\r\n");

        self.sink.write_all(block.as_bytes()).await?;

        self.state = WriterState::HeadersWritten;
        Ok(())
    }

    /// Writes the buffered body in one shot.
    pub async fn write_body(&mut self) -> Result<usize, WriterError> {
        self.require_state(WriterState::HeadersWritten, "write_body")?;

        self.sink.write_all(&self.body).await?;

        self.state = WriterState::BodyWritten;
        Ok(self.body.len())
    }

    /// Emits one chunk: length in hex, CRLF, the bytes, CRLF. An empty
    /// chunk writes nothing - a zero length line would terminate the body.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriterError> {
        self.require_state(WriterState::HeadersWritten, "write_chunked_body")?;

        if chunk.is_empty() {
            return Ok(0);
        }

        let size_line = format!("{:x}\r\n", chunk.len());
        self.sink.write_all(size_line.as_bytes()).await?;
        self.sink.write_all(chunk).await?;
        self.sink.write_all(b"\r\n").await?;

        Ok(chunk.len())
    }

    /// Emits the zero-length terminating chunk.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriterError> {
        self.require_state(WriterState::HeadersWritten, "write_chunked_body_done")?;

        self.sink.write_all(b"0\r\n\r\n").await?;

        self.state = WriterState::BodyWritten;
        Ok(())
    }

    /// Serializes a trailer block the same way as a header block. Only
    /// reachable once the terminating chunk has been emitted.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriterError> {
        self.require_state(WriterState::BodyWritten, "write_trailers")?;

        let mut block = String::new();
        for (name, value) in trailers.iter() {
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
            block.push_str("\r\n");
        }
        block.push_str("\r\n");

        self.sink.write_all(block.as_bytes()).await?;
        Ok(())
    }

    /// Status line, headers and buffered body in order; the whole
    /// non-streaming path in one call.
    pub async fn write_response(&mut self) -> Result<(), WriterError> {
        self.write_status_line().await?;
        self.write_headers().await?;
        self.write_body().await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), WriterError> {
        self.sink.flush().await?;
        Ok(())
    }
}

/// Best-effort canned error response, used when a request never reached a
/// handler (parse failures) or a handler gave up before writing anything.
pub async fn write_error_response<W>(
    sink: W,
    status: StatusCode,
    message: &str,
) -> Result<(), WriterError>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = ResponseWriter::new(sink);
    writer.status = status;
    writer.headers.set("content-type", "text/plain");
    writer.write_str(message);
    writer.write_response().await?;
    writer.flush().await
}
