use palisade::config::UpstreamConfig;
use palisade::proxy::{UpstreamClient, UpstreamResponse};

fn upstream_config(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_string(),
        ..UpstreamConfig::default()
    }
}

#[test]
fn test_build_request_bytes() {
    let client = UpstreamClient::from_config(&upstream_config("http://localhost:9000")).unwrap();

    let bytes = client.build_request_bytes("/get");
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("GET /get HTTP/1.1\r\n"));
    assert!(text.contains("Host: localhost:9000\r\n"));
    assert!(text.contains("Connection: close\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
}

#[test]
fn test_host_header_without_port() {
    let client = UpstreamClient::from_config(&upstream_config("http://origin.internal")).unwrap();

    let text = String::from_utf8(client.build_request_bytes("/")).unwrap();

    assert!(text.contains("Host: origin.internal\r\n"));
}

#[test]
fn test_request_path_joins_base_path() {
    let client =
        UpstreamClient::from_config(&upstream_config("http://origin.internal/api/")).unwrap();

    assert_eq!(client.request_path("/status"), "/api/status");
    assert_eq!(client.request_path(""), "/api/");
}

#[test]
fn test_request_path_defaults_to_root() {
    let client = UpstreamClient::from_config(&upstream_config("http://origin.internal")).unwrap();

    assert_eq!(client.request_path(""), "/");
    assert_eq!(client.request_path("/get"), "/get");
    assert_eq!(client.request_path("get"), "/get");
}

#[test]
fn test_invalid_base_url_is_rejected() {
    assert!(UpstreamClient::from_config(&upstream_config("not a url")).is_err());
}

#[test]
fn test_parse_response_head() {
    let head = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 42\r\n\r\n";

    let response = UpstreamResponse::parse(head).unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.headers.get("content-type"), Some("application/json"));
    assert_eq!(response.headers.get("content-length"), Some("42"));
}

#[test]
fn test_parse_response_head_passes_exotic_status_through() {
    let head = b"HTTP/1.1 418 I'm a teapot\r\n\r\n";

    let response = UpstreamResponse::parse(head).unwrap();

    assert_eq!(response.status.as_u16(), 418);
}

#[test]
fn test_parse_response_head_skips_unparsable_lines() {
    let head = b"HTTP/1.1 200 OK\r\nGoodHeader: yes\r\njunk-line-without-colon\r\n\r\n";

    let response = UpstreamResponse::parse(head).unwrap();

    assert_eq!(response.headers.get("goodheader"), Some("yes"));
}

#[test]
fn test_parse_response_head_rejects_garbage() {
    assert!(UpstreamResponse::parse(b"\r\n\r\n").is_err());
    assert!(UpstreamResponse::parse(b"HTTP/1.1 abc OK\r\n\r\n").is_err());
}
