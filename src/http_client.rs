//! Pooled HTTP Client
//!
//! Features:
//! - Connection pooling with keep-alive, sized for rapid repeated runs
//! - TLS 1.3 via rustls
//! - Redirects followed automatically, every hop recorded
//! - No transparent decompression, so the fingerprint stays exact
//! - Response body read into a buffer sized from `Content-Length`

use std::error::Error as _;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::{Client, Request, Response};
use tracing::{debug, info, instrument};

use crate::config::PoolConfig;
use crate::cookies::Cookie;
use crate::error::{FetchError, Result};
use crate::redirect::{RedirectHistory, RedirectRecorder};

/// Initial body buffer when the server sends no `Content-Length`
const DEFAULT_BODY_CAPACITY: usize = 64 * 1024;

/// Largest up-front allocation trusted from `Content-Length`
const MAX_BODY_PREALLOC: u64 = 8 * 1024 * 1024;

/// Final response of an executed request
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub status_code: u16,
    pub final_url: String,
    pub body: Bytes,
    /// Cookies set by the final response
    pub set_cookies: Vec<Cookie>,
}

impl RequestOutcome {
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// HTTP client with pooled connections and redirect capture
pub struct SessionClient {
    client: Client,
    redirects: RedirectRecorder,
}

impl SessionClient {
    /// Create a client tuned by `pool`
    pub fn new(pool: &PoolConfig) -> Result<Self> {
        let redirects = RedirectRecorder::new();

        let client = Client::builder()
            // ═══════════════════════════════════════════════════════════════
            // CONNECTION REUSE
            // ═══════════════════════════════════════════════════════════════
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(pool.idle_timeout())
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .connect_timeout(pool.connect_timeout())
            // ═══════════════════════════════════════════════════════════════
            // TLS
            // ═══════════════════════════════════════════════════════════════
            .use_rustls_tls()
            // ═══════════════════════════════════════════════════════════════
            // REDIRECTS
            // ═══════════════════════════════════════════════════════════════
            .redirect(redirects.policy())
            // ═══════════════════════════════════════════════════════════════
            // COOKIES - sent explicitly from the captured jar
            // ═══════════════════════════════════════════════════════════════
            .cookie_store(false)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, redirects })
    }

    /// Send `request`, follow redirects, and read the whole body.
    ///
    /// `timeout` bounds the exchange from connect until the last body byte.
    /// Takes `&mut self` so hops from two requests never interleave.
    #[instrument(skip(self, request), fields(url = %request.url()))]
    pub async fn execute(
        &mut self,
        mut request: Request,
        timeout: Duration,
    ) -> Result<(RequestOutcome, RedirectHistory)> {
        self.redirects.take();
        *request.timeout_mut() = Some(timeout);

        debug!("Sending request");
        let mut response = self
            .client
            .execute(request)
            .await
            .map_err(|e| classify(e, timeout))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let set_cookies = response_cookies(&response);

        info!(
            status = status_code,
            version = ?response.version(),
            final_url = %final_url,
            set_cookies = set_cookies.len(),
            "Response received"
        );

        let body = read_body(&mut response, timeout).await?;
        let hops = self.redirects.take();
        debug!(bytes = body.len(), redirects = hops.len(), "Body read");

        let outcome = RequestOutcome {
            status_code,
            final_url: final_url.clone(),
            body,
            set_cookies,
        };
        Ok((outcome, RedirectHistory::new(final_url, hops)))
    }
}

fn response_cookies(response: &Response) -> Vec<Cookie> {
    response
        .cookies()
        .map(|c| Cookie {
            name: c.name().to_string(),
            value: c.value().to_string(),
            domain: c.domain().map(str::to_string),
        })
        .collect()
}

async fn read_body(response: &mut Response, timeout: Duration) -> Result<Bytes> {
    let capacity = response
        .content_length()
        .map(|len| len.min(MAX_BODY_PREALLOC))
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(DEFAULT_BODY_CAPACITY);

    let mut buffer = BytesMut::with_capacity(capacity);
    while let Some(chunk) = response.chunk().await.map_err(|e| classify(e, timeout))? {
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

/// Map a reqwest failure onto the pipeline taxonomy
fn classify(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else if err.is_redirect() || err.is_decode() || err.is_body() || is_malformed(&err) {
        FetchError::Protocol(err)
    } else if err.is_builder() {
        FetchError::Build(err.to_string())
    } else {
        FetchError::Connection(err)
    }
}

/// Whether hyper rejected what the server sent as not being HTTP
fn is_malformed(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            return hyper_err.is_parse() || hyper_err.is_incomplete_message();
        }
        source = cause.source();
    }
    false
}
