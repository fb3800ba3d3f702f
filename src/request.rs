//! Outbound request assembly
//!
//! One GET carrying the captured cookies and the fixed browser fingerprint.

use reqwest::header::{HeaderValue, COOKIE};
use reqwest::{Method, Request};
use tracing::debug;
use url::Url;

use crate::cookies::CookieJar;
use crate::error::{FetchError, Result};
use crate::fingerprint::BrowserProfile;

/// Build the fingerprinted GET for `url`
pub fn build(url: &str, jar: &CookieJar, profile: &BrowserProfile) -> Result<Request> {
    let target = Url::parse(url).map_err(|e| FetchError::Build(format!("invalid URL '{url}': {e}")))?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(FetchError::Build(format!(
            "unsupported URL scheme '{}' in '{url}'",
            target.scheme()
        )));
    }

    let mut request = Request::new(Method::GET, target);
    let headers = request.headers_mut();

    if !jar.is_empty() {
        let cookie_header = HeaderValue::from_str(&jar.cookie_header())
            .map_err(|e| FetchError::Build(format!("cookie header is not a valid header value: {e}")))?;
        headers.insert(COOKIE, cookie_header);
    }

    headers.extend(profile.to_headers());

    debug!(
        url = %request.url(),
        cookies = jar.len(),
        headers = request.headers().len(),
        "Request built"
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::Cookie;

    fn jar(pairs: &[(&str, &str)]) -> CookieJar {
        CookieJar::new(pairs.iter().map(|(n, v)| Cookie::new(*n, *v)).collect())
    }

    #[test]
    fn cookie_header_pairs_follow_jar_order() {
        let j = jar(&[
            ("cf_clearance", "abc123xyz789"),
            ("__cf_bm", "q"),
            ("lang", "de"),
        ]);
        let request = build("https://shop.example/basket", &j, &BrowserProfile::default()).unwrap();

        assert_eq!(
            request.headers().get(COOKIE).unwrap(),
            "cf_clearance=abc123xyz789; __cf_bm=q; lang=de"
        );
    }

    #[test]
    fn fingerprint_headers_are_attached() {
        let request = build(
            "https://shop.example/",
            &jar(&[("a", "1")]),
            &BrowserProfile::default(),
        )
        .unwrap();

        let headers = request.headers();
        assert_eq!(headers.len(), 13);
        assert_eq!(headers.get("sec-fetch-site").unwrap(), "same-origin");
        assert_eq!(headers.get("referer").unwrap(), "https://marketplace.nvidia.com/");
        assert_eq!(request.method(), Method::GET);
    }

    #[test]
    fn empty_jar_sends_no_cookie_header() {
        let request = build("http://shop.example/", &CookieJar::default(), &BrowserProfile::default()).unwrap();
        assert!(request.headers().get(COOKIE).is_none());
    }

    #[test]
    fn malformed_url_is_build_error() {
        let err = build("not a url", &jar(&[]), &BrowserProfile::default()).unwrap_err();
        assert!(matches!(err, FetchError::Build(_)));

        let err = build("ftp://shop.example/", &jar(&[]), &BrowserProfile::default()).unwrap_err();
        assert!(matches!(err, FetchError::Build(_)));
    }

    #[test]
    fn control_characters_in_cookie_are_build_error() {
        let err = build(
            "https://shop.example/",
            &jar(&[("bad", "line\nbreak")]),
            &BrowserProfile::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::Build(_)));
    }
}
