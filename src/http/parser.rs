use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

use crate::config::Config;
use crate::http::headers::HeaderMap;
use crate::http::request::{Method, Request, Version};
use crate::http::tokenizer::{end_of_header, find_terminator, next_token, Span, Token};

/// Why a request could not be turned into a [`Request`].
#[derive(Debug, Error)]
pub enum RequestError {
    /// Malformed request line or header block.
    #[error("bad request: {0}")]
    BadRequest(&'static str),
    /// The first token is not a method this server implements.
    #[error("unknown method {0:?}")]
    UnknownMethod(String),
    /// The peer closed before the header block was complete.
    #[error("connection closed before the request was complete")]
    ConnectionClosed,
    #[error("read failed: {0}")]
    ReadFailure(#[from] std::io::Error),
}

/// Reads from `reader` until a full header block has arrived.
///
/// Stops as soon as a blank line is seen or once `limit` bytes are
/// buffered, whichever comes first. Nothing is carried over between calls.
pub async fn read_header_block<R>(reader: &mut R, limit: usize) -> Result<BytesMut, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(limit);
    let mut temp = [0u8; 1024];

    while end_of_header(&buffer).is_none() && buffer.len() < limit {
        let want = temp.len().min(limit - buffer.len());
        let n = reader.read(&mut temp[..want]).await?;

        if n == 0 {
            // Client closed connection
            return Err(RequestError::ConnectionClosed);
        }

        buffer.extend_from_slice(&temp[..n]);
    }

    Ok(buffer)
}

/// Reads and parses one request from the connection.
///
/// Returns the request and the number of header bytes consumed.
pub async fn parse_request<R>(reader: &mut R, config: &Config) -> Result<(Request, usize), RequestError>
where
    R: AsyncRead + Unpin,
{
    let buffer = read_header_block(reader, config.buffer_size).await?;
    parse_http_request(&buffer, &config.default_document)
}

/// Parses a complete header block held in `buf`.
///
/// On success returns the request and the number of bytes taken by the
/// request line and headers. Any bytes after the blank line are kept as
/// the request body.
pub fn parse_http_request(buf: &[u8], default_document: &str) -> Result<(Request, usize), RequestError> {
    let (headers_end, terminator_len) =
        find_terminator(buf).ok_or(RequestError::BadRequest("unterminated header block"))?;

    let (method, path, version, mut pos) = parse_request_line(buf, default_document)?;

    let mut headers = HeaderMap::new();
    while pos < headers_end {
        pos = parse_header_line(buf, pos, &mut headers)?;
    }

    let body_start = headers_end + terminator_len;
    let body = (body_start < buf.len()).then(|| buf[body_start..].to_vec());

    let request = Request {
        method,
        path,
        version,
        headers,
        body,
    };

    Ok((request, pos.min(buf.len())))
}

fn text(buf: &[u8], span: Span) -> String {
    String::from_utf8_lossy(span.slice(buf)).into_owned()
}

fn parse_request_line(
    buf: &[u8],
    default_document: &str,
) -> Result<(Method, String, Version, usize), RequestError> {
    let (method_span, pos) = match next_token(buf, 0) {
        (Token::Word(span), next) => (span, next),
        _ => return Err(RequestError::BadRequest("missing method")),
    };
    let method_name = text(buf, method_span);
    let method =
        Method::from_str(&method_name).ok_or(RequestError::UnknownMethod(method_name))?;

    let (path_span, mut pos) = match next_token(buf, pos) {
        (Token::Word(span), next) => (span, next),
        _ => return Err(RequestError::BadRequest("missing path")),
    };
    let raw_path = std::str::from_utf8(path_span.slice(buf))
        .map_err(|_| RequestError::BadRequest("path is not valid UTF-8"))?;
    let path = preprocess_path(raw_path, default_document)?;

    let mut version = Version::default();
    match next_token(buf, pos) {
        (Token::Word(span), next) => {
            pos = next;
            let name = text(buf, span);
            match Version::from_str(&name) {
                Some(v) => version = v,
                None => warn!(version = %name, "Unknown HTTP version, assuming {}", version),
            }
        }
        (Token::LineBreak, next) => {
            warn!("HTTP version not provided, assuming {}", version);
            return Ok((method, path, version, next));
        }
        (Token::End, next) => return Ok((method, path, version, next)),
    }

    // Pop the end of the request line, ignoring trailing junk.
    loop {
        match next_token(buf, pos) {
            (Token::Word(_), next) => pos = next,
            (_, next) => return Ok((method, path, version, next)),
        }
    }
}

/// Turns the raw request target into a server-relative path.
///
/// `/` maps to `default_document`; any other path loses its leading slash
/// and is otherwise used as is.
///
/// ```
/// # use shttpd::http::parser::preprocess_path;
/// assert_eq!(preprocess_path("/", "index.html").unwrap(), "index.html");
/// assert_eq!(preprocess_path("/css/site.css", "index.html").unwrap(), "css/site.css");
/// assert!(preprocess_path("site.css", "index.html").is_err());
/// ```
pub fn preprocess_path(raw: &str, default_document: &str) -> Result<String, RequestError> {
    if raw == "/" {
        return Ok(default_document.to_string());
    }
    raw.strip_prefix('/')
        .map(str::to_string)
        .ok_or(RequestError::BadRequest("path must start with '/'"))
}

/// Parses one `Name: value` line starting at `pos` and returns the position
/// of the next line.
fn parse_header_line(buf: &[u8], pos: usize, headers: &mut HeaderMap) -> Result<usize, RequestError> {
    let (name_span, mut pos) = match next_token(buf, pos) {
        (Token::Word(span), next) => (span, next),
        (Token::LineBreak, next) => return Ok(next),
        (Token::End, _) => return Err(RequestError::BadRequest("truncated header line")),
    };

    // `Name:value` without a space still splits on the colon.
    let raw_name = name_span.slice(buf);
    let (name, mut value) = match raw_name.iter().position(|&b| b == b':') {
        Some(colon) if colon + 1 < raw_name.len() => (
            &raw_name[..colon],
            Some(Span {
                start: name_span.start + colon + 1,
                len: name_span.len - colon - 1,
            }),
        ),
        Some(colon) => (&raw_name[..colon], None),
        None => (raw_name, None),
    };

    if name.is_empty() {
        return Err(RequestError::BadRequest("empty header name"));
    }

    // The value runs from its first token to the end of its last one.
    loop {
        let (token, next) = next_token(buf, pos);
        pos = next;
        match token {
            Token::Word(span) => {
                value = Some(match value {
                    Some(first) => Span {
                        start: first.start,
                        len: span.end() - first.start,
                    },
                    None => span,
                });
            }
            Token::LineBreak | Token::End => break,
        }
    }

    let value = value.ok_or(RequestError::BadRequest("header without value"))?;
    headers.insert(&String::from_utf8_lossy(name), text(buf, value));

    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::Header;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req, "index.html").unwrap();

        assert_eq!(parsed.path, "index.html");
        assert_eq!(parsed.header(Header::Host), Some("example.com"));
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn header_value_keeps_inner_spaces() {
        let req = b"GET /a HTTP/1.0\nUser-Agent: curl/8.0 (x86_64)\n\n";

        let (parsed, _) = parse_http_request(req, "index.html").unwrap();

        assert_eq!(parsed.header(Header::UserAgent), Some("curl/8.0 (x86_64)"));
    }
}
