//! Unit tests for the fixed fingerprint

use super::*;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

#[test]
fn test_default_is_brave_windows() {
    assert_eq!(BrowserProfile::default(), BrowserProfile::brave_windows());
}

#[test]
fn test_headers_match_capture_exactly() {
    let headers = BrowserProfile::brave_windows().to_headers();

    assert_eq!(
        header(&headers, "user-agent"),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36"
    );
    assert_eq!(
        header(&headers, "accept"),
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
    );
    assert_eq!(
        header(&headers, "accept-language"),
        "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7"
    );
    assert_eq!(header(&headers, "referer"), "https://marketplace.nvidia.com/");
    assert_eq!(header(&headers, "upgrade-insecure-requests"), "1");
    assert_eq!(
        header(&headers, "sec-ch-ua"),
        r#""Not(A:Brand";v="99", "Brave";v="133", "Chromium";v="133""#
    );
    assert_eq!(header(&headers, "sec-ch-ua-mobile"), "?0");
    assert_eq!(header(&headers, "sec-ch-ua-platform"), r#""Windows""#);
    assert_eq!(header(&headers, "sec-fetch-dest"), "document");
    assert_eq!(header(&headers, "sec-fetch-mode"), "navigate");
    assert_eq!(header(&headers, "sec-fetch-site"), "same-origin");
    assert_eq!(header(&headers, "sec-gpc"), "1");
}

#[test]
fn test_no_extra_headers() {
    let headers = BrowserProfile::default().to_headers();
    assert_eq!(headers.len(), 12);
    assert!(!headers.contains_key("accept-encoding"));
    assert!(!headers.contains_key("sec-fetch-user"));
    assert!(!headers.contains_key("cache-control"));
}

#[test]
fn test_header_order_is_stable() {
    let headers = BrowserProfile::default().to_headers();
    let names: Vec<&str> = headers.keys().map(HeaderName::as_str).collect();
    assert_eq!(names.first(), Some(&"user-agent"));
    assert_eq!(names.last(), Some(&"sec-gpc"));
}
