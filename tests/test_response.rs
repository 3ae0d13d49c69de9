use palisade::http::response::{StatusCode, default_headers};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::OK.as_u16(), 200);
    assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
    assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), 500);
    assert_eq!(StatusCode::BAD_GATEWAY.as_u16(), 502);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    assert_eq!(StatusCode::BAD_REQUEST.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::INTERNAL_SERVER_ERROR.reason_phrase(),
        "Internal Server Error"
    );
    assert_eq!(StatusCode(503).reason_phrase(), "Service Unavailable");
}

#[test]
fn test_unknown_status_code_reason_phrase() {
    assert_eq!(StatusCode(299).reason_phrase(), "Unknown");
    assert_eq!(StatusCode(418).reason_phrase(), "Unknown");
    assert_eq!(StatusCode(999).reason_phrase(), "Unknown");
}

#[test]
fn test_status_code_display() {
    assert_eq!(StatusCode::OK.to_string(), "200 OK");
    assert_eq!(StatusCode(299).to_string(), "299 Unknown");
}

#[test]
fn test_status_code_equality_is_numeric() {
    assert_eq!(StatusCode(200), StatusCode::OK);
    assert_ne!(StatusCode(200), StatusCode(204));
}

#[test]
fn test_default_headers() {
    let h = default_headers();

    assert_eq!(h.get("connection"), Some("close"));
    assert_eq!(h.get("content-type"), Some("text/html"));
    assert_eq!(h.len(), 2);
}
