//! Artifact persistence fan-out
//!
//! Three independent writes run concurrently once a response is in hand:
//!
//! ```text
//!                  ┌─▶ body task      ─▶ final_page.html
//! RequestOutcome ──┼─▶ redirects task ─▶ redirect_history.json
//!                  └─▶ cookies task   ─▶ captured_purchase_cookies.json (merged jar)
//!                          │
//!                  join barrier ─▶ Vec<PersistError>
//! ```
//!
//! A failing task records its error and returns; siblings keep running.
//! Files already written stay written when another task fails.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ArtifactPaths;
use crate::cookies::{Cookie, CookieJar};
use crate::error::{Artifact, PersistError};
use crate::http_client::RequestOutcome;
use crate::redirect::RedirectHistory;

/// Errors reported by the write tasks, shared between them
#[derive(Clone, Default)]
struct ErrorSink {
    errors: Arc<Mutex<Vec<PersistError>>>,
}

impl ErrorSink {
    fn push(&self, err: PersistError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }

    fn into_inner(self) -> Vec<PersistError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Write the body, the redirect history and the merged cookie jar.
///
/// Waits for all three writes and returns every failure; an empty vec means
/// all artifacts are on disk.
pub async fn persist(
    outcome: &RequestOutcome,
    jar: Arc<CookieJar>,
    history: RedirectHistory,
    paths: &ArtifactPaths,
) -> Vec<PersistError> {
    let sink = ErrorSink::default();

    let tasks: Vec<(Artifact, JoinHandle<()>)> = vec![
        (
            Artifact::Body,
            tokio::spawn(save_body(
                outcome.body.clone(),
                paths.body.clone(),
                sink.clone(),
            )),
        ),
        (
            Artifact::Redirects,
            tokio::spawn(save_json(
                Artifact::Redirects,
                history,
                paths.redirects.clone(),
                sink.clone(),
            )),
        ),
        (
            Artifact::Cookies,
            tokio::spawn(save_cookies(
                jar,
                outcome.set_cookies.clone(),
                paths.cookies.clone(),
                sink.clone(),
            )),
        ),
    ];

    let (artifacts, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
    for (artifact, joined) in artifacts.into_iter().zip(join_all(handles).await) {
        if let Err(e) = joined {
            sink.push(PersistError::Aborted {
                artifact,
                reason: e.to_string(),
            });
        }
    }

    let errors = sink.into_inner();
    debug!(failed = errors.len(), "Artifact fan-out joined");
    errors
}

async fn save_body(body: Bytes, path: PathBuf, sink: ErrorSink) {
    match tokio::fs::write(&path, &body).await {
        Ok(()) => info!("Saved final page ({} bytes) to {}", body.len(), path.display()),
        Err(source) => sink.push(PersistError::Storage {
            artifact: Artifact::Body,
            path,
            source,
        }),
    }
}

async fn save_cookies(jar: Arc<CookieJar>, updates: Vec<Cookie>, path: PathBuf, sink: ErrorSink) {
    let merged = jar.merge(&updates);
    debug!(
        before = jar.len(),
        received = updates.len(),
        after = merged.cookies.len(),
        "Cookies merged"
    );
    save_json(Artifact::Cookies, merged, path, sink).await;
}

async fn save_json<T: Serialize>(artifact: Artifact, value: T, path: PathBuf, sink: ErrorSink) {
    let json = match serde_json::to_vec_pretty(&value) {
        Ok(json) => json,
        Err(source) => {
            sink.push(PersistError::Serialization { artifact, source });
            return;
        }
    };

    match tokio::fs::write(&path, json).await {
        Ok(()) => info!("Saved {artifact} to {}", path.display()),
        Err(source) => sink.push(PersistError::Storage {
            artifact,
            path,
            source,
        }),
    }
}
