use crate::http::headers::Headers;

/// HTTP request methods accepted by the server.
///
/// Anything else on the request line is rejected during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// HEAD - Like GET but without the response body
    HEAD,
}

impl Method {
    /// Parses a method token. Case-sensitive: `"get"` is not a method.
    ///
    /// # Example
    ///
    /// ```
    /// # use palisade::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "HEAD" => Some(Method::HEAD),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::HEAD => "HEAD",
        }
    }
}

/// A fully parsed HTTP request.
///
/// Instances are only ever produced by the parser once it has reached its
/// terminal state, so every field is complete and no longer changes.
#[derive(Debug, Clone)]
pub struct Request {
    /// The request method
    pub method: Method,
    /// The request target (e.g. "/coffee"); always starts with `/`
    pub target: String,
    /// HTTP version, normalized from the wire form (`"1.1"`)
    pub http_version: String,
    /// Request headers, names lower-cased
    pub headers: Headers,
    /// Request body; empty unless a Content-Length was declared
    pub body: Vec<u8>,
}

impl Request {
    /// Retrieves a header value by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}
