//! Captured cookie store
//!
//! Reads the cookie file written by the upstream capture step:
//!
//! ```json
//! { "timestamp": "2025-02-20T09:41:07", "cookies": [ { "name": "cf_clearance", "value": "...", "domain": ".example.com" } ] }
//! ```
//!
//! and produces the merged jar written back after the request. The merged
//! shape has no `domain` field; downstream readers expect exactly
//! `{ name, value }` pairs.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock;
use crate::error::{FetchError, Result};

/// Characters of a secret cookie value shown in logs
const PREVIEW_CHARS: usize = 10;

/// A browser cookie as captured upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// Ordered cookie collection loaded from the capture file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieJar {
    /// Opaque capture time written by the producer
    #[serde(rename = "timestamp", default)]
    pub captured_at: String,
    pub cookies: Vec<Cookie>,
}

/// State of a cookie the target requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieStatus<'a> {
    Present(&'a str),
    Empty,
    Missing,
}

impl CookieStatus<'_> {
    pub fn is_usable(&self) -> bool {
        matches!(self, CookieStatus::Present(_))
    }
}

impl CookieJar {
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self {
            captured_at: clock::timestamp(),
            cookies,
        }
    }

    /// Load a jar from a capture file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|source| FetchError::Storage {
            path: path.to_path_buf(),
            source,
        })?;

        let jar: CookieJar = serde_json::from_slice(&raw).map_err(|source| FetchError::Format {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(count = jar.cookies.len(), path = %path.display(), "Cookie file parsed");
        Ok(jar)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for `name`; a repeated name resolves to its last entry
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .rev()
            .find(|cookie| cookie.name == name)
            .map(|cookie| cookie.value.as_str())
    }

    /// Whether a required cookie is present with a non-empty value
    pub fn credential(&self, name: &str) -> CookieStatus<'_> {
        match self.get(name) {
            Some("") => CookieStatus::Empty,
            Some(value) => CookieStatus::Present(value),
            None => CookieStatus::Missing,
        }
    }

    /// `Cookie` header value: every pair in jar order, joined by `"; "`
    pub fn cookie_header(&self) -> String {
        let mut header = String::with_capacity(1024);
        for (i, cookie) in self.cookies.iter().enumerate() {
            if i > 0 {
                header.push_str("; ");
            }
            header.push_str(&cookie.name);
            header.push('=');
            header.push_str(&cookie.value);
        }
        header
    }

    /// Fold response cookies into a new jar.
    ///
    /// Names are unique in the result. An update for a known name replaces
    /// the value at that name's first position; unknown names are appended in
    /// the order they were received. Domains are dropped.
    pub fn merge(&self, updates: &[Cookie]) -> PersistedJar {
        let mut cookies: Vec<PersistedCookie> = Vec::with_capacity(self.len() + updates.len());
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(self.len() + updates.len());

        for cookie in self.cookies.iter().chain(updates) {
            match index.get(cookie.name.as_str()) {
                Some(&slot) => cookies[slot].value.clone_from(&cookie.value),
                None => {
                    index.insert(cookie.name.as_str(), cookies.len());
                    cookies.push(PersistedCookie {
                        name: cookie.name.clone(),
                        value: cookie.value.clone(),
                    });
                }
            }
        }

        PersistedJar {
            timestamp: clock::timestamp(),
            cookies,
        }
    }
}

/// Look up `name` as it would appear after merging `updates` into `jar`
pub fn resolve<'a>(jar: &'a CookieJar, updates: &'a [Cookie], name: &str) -> Option<&'a str> {
    updates
        .iter()
        .rev()
        .find(|cookie| cookie.name == name)
        .map(|cookie| cookie.value.as_str())
        .or_else(|| jar.get(name))
}

/// Name/value pair in the merged output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCookie {
    pub name: String,
    pub value: String,
}

/// Cookie jar as written after the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedJar {
    pub timestamp: String,
    pub cookies: Vec<PersistedCookie>,
}

impl PersistedJar {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name == name)
            .map(|cookie| cookie.value.as_str())
    }
}

/// Shortened form of a secret value for logs
pub fn preview(value: &str) -> String {
    match value.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
