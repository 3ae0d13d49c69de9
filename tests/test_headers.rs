use palisade::http::headers::Headers;
use palisade::http::parser::ParseError;

#[test]
fn test_parse_single_header() {
    let mut h = Headers::new();
    let data = b"Host: localhost:42069\r\n\r\n";

    let (n, done) = h.parse(data).unwrap();

    assert_eq!(h.get("host"), Some("localhost:42069"));
    assert_eq!(n, data.len());
    assert!(done);
}

#[test]
fn test_parse_without_terminator_consumes_lines_only() {
    let mut h = Headers::new();
    let data = b"Host: example.com\r\nAccept: */*\r\n";

    let (n, done) = h.parse(data).unwrap();

    assert_eq!(h.get("host"), Some("example.com"));
    assert_eq!(h.get("accept"), Some("*/*"));
    assert_eq!(n, data.len());
    assert!(!done);
}

#[test]
fn test_parse_empty_line_terminates_block() {
    let mut h = Headers::new();

    let (n, done) = h.parse(b"\r\n").unwrap();

    assert_eq!(n, 2);
    assert!(done);
    assert!(h.is_empty());
}

#[test]
fn test_parse_no_complete_line_waits_for_more() {
    let mut h = Headers::new();

    let (n, done) = h.parse(b"Host: examp").unwrap();

    assert_eq!(n, 0);
    assert!(!done);
    assert!(h.is_empty());
}

#[test]
fn test_parse_is_resumable_across_calls() {
    let mut h = Headers::new();
    let data: &[u8] = b"Host: example.com\r\nAccept: */*\r\n\r\n";

    // feed in two arbitrary pieces, advancing by what was consumed
    let split = 22;
    let (n1, done1) = h.parse(&data[..split]).unwrap();
    assert!(!done1);

    let (n2, done2) = h.parse(&data[n1..]).unwrap();
    assert!(done2);
    assert_eq!(n1 + n2, data.len());
    assert_eq!(h.get("host"), Some("example.com"));
    assert_eq!(h.get("accept"), Some("*/*"));
}

#[test]
fn test_parse_repeated_name_folds_values() {
    let mut h = Headers::new();
    let data = b"Host: a\r\nX: 1\r\nX: 2\r\n\r\n";

    let (_, done) = h.parse(data).unwrap();

    assert!(done);
    assert_eq!(h.get("x"), Some("1, 2"));
    assert_eq!(h.get("host"), Some("a"));
}

#[test]
fn test_parse_name_is_lowercased() {
    let mut h = Headers::new();

    h.parse(b"Content-Type: text/html\r\n\r\n").unwrap();

    assert_eq!(h.get("content-type"), Some("text/html"));
    assert_eq!(h.get("Content-Type"), Some("text/html"));
}

#[test]
fn test_parse_value_is_trimmed() {
    let mut h = Headers::new();

    h.parse(b"Host:    spaced.example.com   \r\n\r\n").unwrap();

    assert_eq!(h.get("host"), Some("spaced.example.com"));
}

#[test]
fn test_parse_space_before_colon_is_rejected() {
    let mut h = Headers::new();

    let err = h.parse(b"Host : localhost:42069\r\n\r\n").unwrap_err();

    assert!(matches!(err, ParseError::SpaceBeforeColon));
}

#[test]
fn test_parse_invalid_name_character_is_rejected() {
    let mut h = Headers::new();

    let err = h.parse(b"Us@er: value\r\n\r\n").unwrap_err();

    assert!(matches!(err, ParseError::InvalidHeaderName));
}

#[test]
fn test_parse_invalid_value_byte_is_rejected() {
    let mut h = Headers::new();

    let err = h.parse(b"host: value\x7f\r\n\r\n").unwrap_err();

    assert!(matches!(err, ParseError::InvalidHeaderValue));
}

#[test]
fn test_parse_missing_colon_is_rejected() {
    let mut h = Headers::new();

    let err = h.parse(b"BrokenHeader\r\n\r\n").unwrap_err();

    assert!(matches!(err, ParseError::MissingColon));
}

#[test]
fn test_parse_empty_name_is_rejected() {
    let mut h = Headers::new();

    let err = h.parse(b": value\r\n\r\n").unwrap_err();

    assert!(matches!(err, ParseError::EmptyHeaderName));
}

#[test]
fn test_parse_token_punctuation_is_accepted() {
    let mut h = Headers::new();

    h.parse(b"X-Api+Key.v2: ok\r\n\r\n").unwrap();

    assert_eq!(h.get("x-api+key.v2"), Some("ok"));
}

#[test]
fn test_parse_value_allows_horizontal_tab() {
    let mut h = Headers::new();

    h.parse(b"X-Note: a\tb\r\n\r\n").unwrap();

    assert_eq!(h.get("x-note"), Some("a\tb"));
}

#[test]
fn test_set_replaces_and_add_folds() {
    let mut h = Headers::new();

    h.set("Accept", "text/plain");
    h.set("Accept", "text/html");
    assert_eq!(h.get("accept"), Some("text/html"));

    h.add("Accept", "application/json");
    assert_eq!(h.get("accept"), Some("text/html, application/json"));
}

#[test]
fn test_remove_is_case_insensitive() {
    let mut h = Headers::new();

    h.set("Content-Length", "12");
    assert_eq!(h.remove("content-length"), Some("12".to_string()));
    assert!(h.get("content-length").is_none());
}
