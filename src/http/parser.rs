use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::buffer::ReadBuffer;
use crate::http::headers::{Headers, find_crlf};
use crate::http::request::{Method, Request};

const WIRE_VERSION: &str = "HTTP/1.1";
const NORMALIZED_VERSION: &str = "1.1";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid request line: {0:?}")]
    InvalidRequestLine(String),
    #[error("unsupported or malformed method: {0:?}")]
    InvalidMethod(String),
    #[error("invalid request target: {0:?}")]
    InvalidTarget(String),
    #[error("unsupported http version: {0:?}")]
    InvalidVersion(String),
    #[error("invalid header: missing colon")]
    MissingColon,
    #[error("invalid spacing before colon")]
    SpaceBeforeColon,
    #[error("empty header name")]
    EmptyHeaderName,
    #[error("invalid character in header name")]
    InvalidHeaderName,
    #[error("invalid character in header value")]
    InvalidHeaderValue,
    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),
    #[error("request already complete")]
    AlreadyComplete,
    #[error("request is not complete")]
    Incomplete,
    #[error("unexpected end of stream before request was complete")]
    UnexpectedEof,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parsing phase. The declared body length only exists while a body is
/// actually being read, so a length outside the body phase is
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Initialized,
    ParsingHeaders,
    ParsingBody { declared: usize },
    Done,
}

/// Incremental request parser.
///
/// Feed it the unconsumed prefix of the connection's read buffer as often
/// as new bytes arrive; it consumes what it can and reports how far it
/// got. Zero consumed bytes with no error means "need more data". Once the
/// parser reports done, [`RequestParser::finish`] yields the request and
/// any further feeding is a protocol error.
#[derive(Debug, Default)]
pub struct RequestParser {
    state: ParseState,
    method: Option<Method>,
    target: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for ParseState {
    fn default() -> Self {
        ParseState::Initialized
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Consumes as much of `data` as the current state allows and returns
    /// the number of bytes consumed. The caller must not re-feed consumed
    /// bytes.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.state == ParseState::Done {
            return Err(ParseError::AlreadyComplete);
        }

        let mut consumed = 0;

        if self.state == ParseState::Initialized {
            let n = self.parse_request_line(data)?;
            if n == 0 {
                return Ok(0);
            }
            consumed += n;
            self.state = ParseState::ParsingHeaders;
        }

        while self.state == ParseState::ParsingHeaders {
            let (n, done) = self.headers.parse(&data[consumed..])?;
            consumed += n;

            if done {
                self.state = self.body_state()?;
            } else if n == 0 {
                // mid-header-block, wait for more bytes
                return Ok(consumed);
            }
        }

        if let ParseState::ParsingBody { declared } = self.state {
            let remaining = declared - self.body.len();
            let take = remaining.min(data.len() - consumed);
            self.body.extend_from_slice(&data[consumed..consumed + take]);
            consumed += take;

            if self.body.len() == declared {
                self.state = ParseState::Done;
            }
        }

        Ok(consumed)
    }

    /// Extracts the finished request. `None` until the parser is done.
    pub fn finish(self) -> Option<Request> {
        if self.state != ParseState::Done {
            return None;
        }

        Some(Request {
            method: self.method?,
            target: self.target?,
            http_version: NORMALIZED_VERSION.to_string(),
            headers: self.headers,
            body: self.body,
        })
    }

    fn parse_request_line(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(idx) = find_crlf(data) else {
            return Ok(0);
        };

        let line = std::str::from_utf8(&data[..idx])
            .map_err(|_| ParseError::InvalidRequestLine(String::from_utf8_lossy(&data[..idx]).into_owned()))?;

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(ParseError::InvalidRequestLine(line.to_string()));
        }

        let (method, target, version) = (fields[0], fields[1], fields[2]);

        if has_lowercase_letter(method) {
            return Err(ParseError::InvalidMethod(method.to_string()));
        }
        let method = Method::from_str(method).ok_or_else(|| ParseError::InvalidMethod(method.to_string()))?;

        if !target.starts_with('/') {
            return Err(ParseError::InvalidTarget(target.to_string()));
        }

        if has_lowercase_letter(version) || version != WIRE_VERSION {
            return Err(ParseError::InvalidVersion(version.to_string()));
        }

        self.method = Some(method);
        self.target = Some(target.to_string());

        Ok(idx + 2)
    }

    /// Picks the state that follows a complete header block. No declared
    /// length means no body: trailing bytes are deliberately left
    /// unconsumed rather than guessed at.
    fn body_state(&self) -> Result<ParseState, ParseError> {
        match self.headers.get("content-length") {
            None => Ok(ParseState::Done),
            Some(v) => {
                let declared: usize = v
                    .trim()
                    .parse()
                    .map_err(|_| ParseError::InvalidContentLength(v.to_string()))?;

                if declared == 0 {
                    Ok(ParseState::Done)
                } else {
                    Ok(ParseState::ParsingBody { declared })
                }
            }
        }
    }
}

/// Capitalization check over letters only; digits and punctuation pass.
fn has_lowercase_letter(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_lowercase())
}

/// Reads a complete request from `reader`, tolerating reads of any size.
///
/// Owns the connection's [`ReadBuffer`]: each iteration grows the arena if
/// it is full, reads, lets the state machine consume the filled prefix and
/// compacts. The stream ending before the parser is done - a truncated
/// request line, header block or declared body - is an error, never a
/// silently shortened request.
pub async fn request_from_reader<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut parser = RequestParser::new();
    let mut buf = ReadBuffer::new();

    loop {
        if buf.is_full() {
            buf.grow();
        }

        let n = reader.read(buf.spare_mut()).await?;
        if n == 0 {
            return Err(ParseError::UnexpectedEof);
        }
        buf.advance_filled(n);

        let consumed = parser.parse(buf.unread())?;
        if consumed > 0 {
            buf.consume(consumed);
        }

        if parser.is_done() {
            return parser.finish().ok_or(ParseError::Incomplete);
        }
    }
}
