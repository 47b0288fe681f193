use shttpd::config::Config;
use shttpd::http::headers::Header;
use shttpd::http::parser::{parse_http_request, parse_request, RequestError};
use shttpd::http::request::{Method, Version};
use tokio::io::AsyncWriteExt;

const INDEX: &str = "index.html";

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "index.html");
    assert_eq!(parsed.version, Version::Http11);
    assert_eq!(parsed.header(Header::Host), Some("x"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_head_request() {
    let req = b"HEAD /style.css HTTP/1.0\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.method, Method::HEAD);
    assert_eq!(parsed.path, "style.css");
    assert_eq!(parsed.version, Version::Http10);
    assert!(parsed.headers.is_empty());
}

#[test]
fn test_parse_root_maps_to_default_document() {
    let (parsed, _) = parse_http_request(b"GET / HTTP/1.1\r\n\r\n", INDEX).unwrap();
    assert_eq!(parsed.path, "index.html");

    let (parsed, _) = parse_http_request(b"GET / HTTP/1.1\r\n\r\n", "home.htm").unwrap();
    assert_eq!(parsed.path, "home.htm");
}

#[test]
fn test_parse_unix_line_endings() {
    let req = b"GET /a/b.txt HTTP/1.1\nHost: example.com\nAccept: */*\n\n";
    let (parsed, consumed) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.path, "a/b.txt");
    assert_eq!(parsed.header(Header::Host), Some("example.com"));
    assert_eq!(parsed.header(Header::Accept), Some("*/*"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_query_string_kept_verbatim() {
    let req = b"GET /search?q=rust HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.path, "search?q=rust");
}

#[test]
fn test_parse_header_names_are_case_insensitive() {
    let req = b"GET / HTTP/1.1\r\nhost: a\r\nUSER-AGENT: b\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.header(Header::Host), Some("a"));
    assert_eq!(parsed.header(Header::UserAgent), Some("b"));
}

#[test]
fn test_parse_last_header_occurrence_wins() {
    let req = b"GET / HTTP/1.1\r\nHost: first\r\nHost: second\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.header(Header::Host), Some("second"));
}

#[test]
fn test_parse_unknown_headers_are_kept() {
    let req = b"GET / HTTP/1.1\r\nX-Custom: 1\r\nX-Other: two words\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(
        parsed.headers.extra(),
        &[
            ("X-Custom".to_string(), "1".to_string()),
            ("X-Other".to_string(), "two words".to_string()),
        ]
    );
    assert_eq!(parsed.headers.get_by_name("x-other"), Some("two words"));
}

#[test]
fn test_parse_header_without_space_after_colon() {
    let req = b"GET / HTTP/1.1\r\nHost:example.com\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.header(Header::Host), Some("example.com"));
}

#[test]
fn test_parse_missing_version_defaults_to_http10() {
    let req = b"GET /file.txt\r\nHost: x\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.version, Version::Http10);
    assert_eq!(parsed.header(Header::Host), Some("x"));
}

#[test]
fn test_parse_unknown_version_is_tolerated() {
    let req = b"GET /file.txt HTTP/2.0\r\n\r\n";
    let (parsed, _) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.version, Version::Http10);
}

#[test]
fn test_parse_captures_trailing_bytes_as_body() {
    let req = b"GET / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_http_request(req, INDEX).unwrap();

    assert_eq!(parsed.body.as_deref(), Some(&b"hello"[..]));
    assert_eq!(parsed.content_length(), 5);
    assert_eq!(consumed, req.len() - 5);
}

#[test]
fn test_parse_unknown_method() {
    let result = parse_http_request(b"POST / HTTP/1.1\r\n\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::UnknownMethod(m)) if m == "POST"));
}

#[test]
fn test_parse_method_is_case_sensitive() {
    let result = parse_http_request(b"get / HTTP/1.1\r\n\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::UnknownMethod(_))));
}

#[test]
fn test_parse_missing_path() {
    let result = parse_http_request(b"GET\r\n\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::BadRequest(_))));
}

#[test]
fn test_parse_missing_method() {
    let result = parse_http_request(b"\r\n\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::BadRequest(_))));
}

#[test]
fn test_parse_relative_path_rejected() {
    let result = parse_http_request(b"GET index.html HTTP/1.1\r\n\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::BadRequest(_))));
}

#[test]
fn test_parse_header_without_value() {
    let result = parse_http_request(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::BadRequest(_))));

    let result = parse_http_request(b"GET / HTTP/1.1\r\nHost:\r\n\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::BadRequest(_))));
}

#[test]
fn test_parse_unterminated_header_block() {
    let result = parse_http_request(b"GET / HTTP/1.1\r\nHost: x\r\n", INDEX);
    assert!(matches!(result, Err(RequestError::BadRequest(_))));
}

fn test_config() -> Config {
    Config::new("127.0.0.1:0".parse().unwrap())
}

#[tokio::test]
async fn test_parse_request_reads_across_chunks() {
    let (mut client, mut server) = tokio::io::duplex(64);

    let writer = tokio::spawn(async move {
        client.write_all(b"GET /a.txt HT").await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(b"TP/1.1\r\nHost: x\r").await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(b"\n\r\n").await.unwrap();
        client
    });

    let (request, _) = parse_request(&mut server, &test_config()).await.unwrap();
    assert_eq!(request.path, "a.txt");
    assert_eq!(request.version, Version::Http11);
    assert_eq!(request.header(Header::Host), Some("x"));

    drop(writer.await.unwrap());
}

#[tokio::test]
async fn test_parse_request_peer_closes_early() {
    let (mut client, mut server) = tokio::io::duplex(64);
    client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
    drop(client);

    let result = parse_request(&mut server, &test_config()).await;
    assert!(matches!(result, Err(RequestError::ConnectionClosed)));
}

#[tokio::test]
async fn test_parse_request_buffer_fills_without_terminator() {
    let mut config = test_config();
    config.buffer_size = 32;

    let (mut client, mut server) = tokio::io::duplex(128);
    client
        .write_all(b"GET / HTTP/1.1\r\nX-Padding: aaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n")
        .await
        .unwrap();

    let result = parse_request(&mut server, &config).await;
    assert!(matches!(result, Err(RequestError::BadRequest(_))));
}
