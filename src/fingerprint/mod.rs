//! Browser Fingerprint
//!
//! The clearance cookie is bound to the browser that solved the challenge.
//! The edge compares every request against that browser's headers, so the
//! profile here is a fixed byte-for-byte copy of the capturing browser
//! (Brave 133 on Windows), not a randomised "realistic" profile.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

#[cfg(test)]
mod tests;

/// Header set sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: &'static str,
    pub accept: &'static str,
    pub accept_language: &'static str,
    pub referer: &'static str,
    pub upgrade_insecure_requests: &'static str,
    pub sec_ch_ua: &'static str,
    pub sec_ch_ua_mobile: &'static str,
    pub sec_ch_ua_platform: &'static str,
    pub sec_fetch_dest: &'static str,
    pub sec_fetch_mode: &'static str,
    pub sec_fetch_site: &'static str,
    pub sec_gpc: &'static str,
}

impl BrowserProfile {
    /// Brave 133 / Windows 10 profile the capture step ran under
    pub const fn brave_windows() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36",
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            accept_language: "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7",
            referer: "https://marketplace.nvidia.com/",
            upgrade_insecure_requests: "1",
            sec_ch_ua: "\"Not(A:Brand\";v=\"99\", \"Brave\";v=\"133\", \"Chromium\";v=\"133\"",
            sec_ch_ua_mobile: "?0",
            sec_ch_ua_platform: "\"Windows\"",
            sec_fetch_dest: "document",
            sec_fetch_mode: "navigate",
            sec_fetch_site: "same-origin",
            sec_gpc: "1",
        }
    }

    /// Convert profile to reqwest `HeaderMap`, in the order browsers send them
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(12);

        headers.insert(USER_AGENT, HeaderValue::from_static(self.user_agent));
        headers.insert(ACCEPT, HeaderValue::from_static(self.accept));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(self.accept_language));
        headers.insert(REFERER, HeaderValue::from_static(self.referer));
        headers.insert(
            UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static(self.upgrade_insecure_requests),
        );

        // Client hints
        headers.insert(
            HeaderName::from_static("sec-ch-ua"),
            HeaderValue::from_static(self.sec_ch_ua),
        );
        headers.insert(
            HeaderName::from_static("sec-ch-ua-mobile"),
            HeaderValue::from_static(self.sec_ch_ua_mobile),
        );
        headers.insert(
            HeaderName::from_static("sec-ch-ua-platform"),
            HeaderValue::from_static(self.sec_ch_ua_platform),
        );

        // Fetch metadata
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static(self.sec_fetch_dest),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static(self.sec_fetch_mode),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static(self.sec_fetch_site),
        );
        headers.insert(
            HeaderName::from_static("sec-gpc"),
            HeaderValue::from_static(self.sec_gpc),
        );

        headers
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self::brave_windows()
    }
}
