use chrono::{DateTime, Utc};

use crate::http::request::Version;

/// Name sent in the `Server` header.
pub const SERVER_NAME: &str = "shttpd";

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): File found and sent
/// - `BadRequest` (400): Malformed request line or headers
/// - `Forbidden` (403): File exists but cannot be read
/// - `NotFound` (404): No such file
/// - `InternalServerError` (500): Any other failure opening the file
/// - `NotImplemented` (501): Method is not GET or HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use shttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use shttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::Forbidden.reason_phrase(), "Forbidden");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// A response head: status line plus headers, in the order they are sent.
///
/// The body, if any, is streamed separately straight from the file.
#[derive(Debug, Clone)]
pub struct Response {
    pub version: Version,
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
}

/// Builder for response heads. Headers keep insertion order.
pub struct ResponseBuilder {
    version: Version,
    status: StatusCode,
    headers: Vec<(String, String)>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: Version::Http10,
            status,
            headers: Vec::new(),
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Appends a header after the ones already added.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Response {
        Response {
            version: self.version,
            status: self.status,
            headers: self.headers,
        }
    }
}

impl Response {
    /// A bare status line with no headers, used for every error reply.
    pub fn status_only(version: Version, status: StatusCode) -> Self {
        ResponseBuilder::new(status).version(version).build()
    }

    /// Head of a successful file response.
    ///
    /// `Last-Modified` carries the same timestamp as `Date`.
    pub fn file(content_type: &str, content_length: u64, now: DateTime<Utc>) -> Self {
        let date = http_date(now);
        ResponseBuilder::new(StatusCode::Ok)
            .header("Server", server_ident())
            .header("Date", date.clone())
            .header("Content-type", content_type)
            .header("Content-length", content_length.to_string())
            .header("Last-Modified", date)
            .build()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// `shttpd/<major>.<minor>.<patch>`
pub fn server_ident() -> String {
    format!("{}/{}", SERVER_NAME, env!("CARGO_PKG_VERSION"))
}

/// Formats a timestamp as `Dow, Day Mon Year H:M:S GMT`.
///
/// Day and time fields are not zero padded.
///
/// ```
/// # use chrono::{TimeZone, Utc};
/// # use shttpd::http::response::http_date;
/// let t = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
/// assert_eq!(http_date(t), "Tue, 5 Mar 2024 7:8:9 GMT");
/// ```
pub fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %-d %b %Y %-H:%-M:%-S GMT").to_string()
}
