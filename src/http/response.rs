use std::fmt;

use crate::http::headers::Headers;

/// An HTTP status code.
///
/// Deliberately open rather than a closed enum: the proxy passes whatever
/// numeric status the upstream answered straight through, including codes
/// the reason-phrase table has never heard of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The standard reason phrase, or `"Unknown"` for a code outside the
    /// table. Status-line emission never fails on an exotic code.
    ///
    /// # Example
    ///
    /// ```
    /// # use palisade::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode(418).reason_phrase(), "Unknown");
    /// ```
    pub fn reason_phrase(self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            400 => "Bad Request",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// Headers every response starts from. One request per connection, so the
/// peer is always told the connection is closing.
pub fn default_headers() -> Headers {
    let mut h = Headers::new();
    h.set("connection", "close");
    h.set("content-type", "text/html");
    h
}
