use std::fmt;

use crate::http::headers::{Header, HeaderMap};

/// HTTP request methods.
///
/// Only the methods a static file server can answer are listed. Anything
/// else is rejected with 501 Not Implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a file
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
}

/// Protocol version named on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    #[default]
    Http10,
    Http11,
}

/// Represents a parsed HTTP request from a client.
///
/// The path is already server-relative: the leading slash is gone and `/`
/// has been replaced by the default document.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET or HEAD)
    pub method: Method,
    /// Path of the requested file, relative to the server root
    pub path: String,
    /// HTTP version, HTTP/1.0 unless the client named a known one
    pub version: Version,
    /// Request headers
    pub headers: HeaderMap,
    /// Bytes that arrived after the header block, if any
    pub body: Option<Vec<u8>>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Version,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// ```
    /// # use shttpd::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Version {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "HTTP/1.0" => Some(Version::Http10),
            "HTTP/1.1" => Some(Version::Http11),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: Version::default(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version,
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Request {
    /// Retrieves a known header value.
    pub fn header(&self, header: Header) -> Option<&str> {
        self.headers.get(header)
    }

    /// Value of the Content-Length header, 0 when missing or not a number.
    ///
    /// Informational only: the server never reads a body past the header
    /// buffer.
    pub fn content_length(&self) -> usize {
        self.header(Header::ContentLength)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Whether the response should carry the file contents.
    pub fn wants_body(&self) -> bool {
        self.method == Method::GET
    }
}
