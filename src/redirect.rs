//! Redirect chain capture
//!
//! reqwest follows redirects internally and only exposes each hop to the
//! redirect policy callback. [`RedirectRecorder`] is shared with that
//! callback and collects the hops of the request in flight.

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::redirect::{Attempt, Policy};
use serde::{Deserialize, Serialize};

use crate::clock;

/// Hops followed before giving up (reqwest's default cap)
pub const MAX_REDIRECTS: usize = 10;

/// One followed redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectHop {
    pub from: String,
    pub to: String,
    pub status_code: u16,
}

/// Redirect chain of a completed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectHistory {
    #[serde(rename = "timestamp")]
    pub recorded_at: String,
    pub final_url: String,
    pub redirects: Vec<RedirectHop>,
}

impl RedirectHistory {
    pub fn new(final_url: impl Into<String>, redirects: Vec<RedirectHop>) -> Self {
        Self {
            recorded_at: clock::timestamp(),
            final_url: final_url.into(),
            redirects,
        }
    }
}

/// Hop sink shared between a client's redirect policy and its owner
#[derive(Debug, Clone, Default)]
pub struct RedirectRecorder {
    hops: Arc<Mutex<Vec<RedirectHop>>>,
}

impl RedirectRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy that follows up to [`MAX_REDIRECTS`] hops and records each one
    pub fn policy(&self) -> Policy {
        let recorder = self.clone();
        Policy::custom(move |attempt| recorder.check(attempt))
    }

    fn check(&self, attempt: Attempt<'_>) -> reqwest::redirect::Action {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error(format!("too many redirects (limit {MAX_REDIRECTS})"));
        }

        // `previous` starts with the original URL and ends with the one that
        // answered with this redirect
        if let Some(from) = attempt.previous().last() {
            self.record(RedirectHop {
                from: from.to_string(),
                to: attempt.url().to_string(),
                status_code: attempt.status().as_u16(),
            });
        }
        attempt.follow()
    }

    pub fn record(&self, hop: RedirectHop) {
        self.hops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hop);
    }

    /// Drain the recorded hops
    pub fn take(&self) -> Vec<RedirectHop> {
        std::mem::take(&mut *self.hops.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_in_record_order() {
        let recorder = RedirectRecorder::new();
        recorder.record(RedirectHop {
            from: "https://a.example/".into(),
            to: "https://b.example/".into(),
            status_code: 302,
        });
        recorder.record(RedirectHop {
            from: "https://b.example/".into(),
            to: "https://c.example/".into(),
            status_code: 301,
        });

        let hops = recorder.take();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].to, hops[1].from);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn clones_share_one_sink() {
        let recorder = RedirectRecorder::new();
        recorder.clone().record(RedirectHop {
            from: "a".into(),
            to: "b".into(),
            status_code: 307,
        });
        assert_eq!(recorder.take().len(), 1);
    }

    #[test]
    fn history_serializes_with_snake_case_keys() {
        let history = RedirectHistory::new(
            "https://shop.example/cart",
            vec![RedirectHop {
                from: "https://shop.example/buy".into(),
                to: "https://shop.example/cart".into(),
                status_code: 302,
            }],
        );
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["final_url"], "https://shop.example/cart");
        assert_eq!(json["redirects"][0]["status_code"], 302);
        assert!(json["timestamp"].is_string());
    }
}
