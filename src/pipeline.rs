//! Fetch pipeline orchestration
//!
//! ```text
//! Idle ─▶ CookiesLoaded ─▶ RequestBuilt ─▶ ResponseReceived ─▶ ArtifactsPersisted
//!              │                                                      │
//!              └─ clearance cookie missing ─▶ Warning      200 ─▶ Success
//!                                                          other ─▶ Warning
//! ```
//!
//! Any fatal error along the way ends the run as `Err(FetchError)`.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::cookies::{self, CookieJar, CookieStatus};
use crate::error::{FetchError, Result};
use crate::fingerprint::BrowserProfile;
use crate::http_client::SessionClient;
use crate::persist::persist;
use crate::request;

/// Pipeline progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    CookiesLoaded,
    RequestBuilt,
    ResponseReceived,
    ArtifactsPersisted,
}

/// Why a run finished without full success
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningReason {
    /// The clearance cookie is not in the jar
    MissingClearance(String),
    /// The clearance cookie is in the jar with an empty value
    EmptyClearance(String),
    /// The target answered with something other than 200
    UnexpectedStatus(u16),
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningReason::MissingClearance(name) => write!(f, "no {name} cookie found"),
            WarningReason::EmptyClearance(name) => write!(f, "{name} cookie is empty"),
            WarningReason::UnexpectedStatus(code) => write!(f, "target answered HTTP {code}"),
        }
    }
}

/// Non-fatal result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Warning(WarningReason),
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Last stage reached
    pub stage: Stage,
    pub status_code: Option<u16>,
    pub final_url: Option<String>,
    pub redirects: usize,
    /// Session cookie value after the merge, if the target set or kept one
    pub session_cookie: Option<String>,
    pub elapsed: Duration,
}

impl RunReport {
    fn new(outcome: Outcome, stage: Stage, started: Instant) -> Self {
        Self {
            outcome,
            stage,
            status_code: None,
            final_url: None,
            redirects: 0,
            session_cookie: None,
            elapsed: started.elapsed(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Load, build, execute, persist
pub struct Pipeline {
    config: Config,
    profile: BrowserProfile,
    client: SessionClient,
    stage: Stage,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let client = SessionClient::new(&config.pool)?;
        Ok(Self {
            config,
            profile: BrowserProfile::default(),
            client,
            stage: Stage::Idle,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "Stage transition");
        self.stage = stage;
    }

    /// Run the pipeline once against `url`
    pub async fn run(&mut self, url: &str) -> Result<RunReport> {
        let started = Instant::now();
        self.stage = Stage::Idle;

        let cookie_file = &self.config.cookie_file;
        info!("Loading cookies from {}", cookie_file.display());
        let jar = CookieJar::load(cookie_file)?;
        info!("Loaded {} cookies from {}", jar.len(), cookie_file.display());
        self.advance(Stage::CookiesLoaded);

        let clearance = &self.config.clearance_cookie;
        match jar.credential(clearance) {
            CookieStatus::Present(value) => {
                info!("Found {clearance} cookie: {}", cookies::preview(value));
            }
            CookieStatus::Empty => {
                warn!("{clearance} cookie is empty, not sending request");
                let reason = WarningReason::EmptyClearance(clearance.clone());
                return Ok(RunReport::new(Outcome::Warning(reason), self.stage, started));
            }
            CookieStatus::Missing => {
                warn!("No {clearance} cookie found, not sending request");
                let reason = WarningReason::MissingClearance(clearance.clone());
                return Ok(RunReport::new(Outcome::Warning(reason), self.stage, started));
            }
        }

        let request = request::build(url, &jar, &self.profile)?;
        self.advance(Stage::RequestBuilt);

        info!("Making request to {url}");
        let (outcome, history) = self.client.execute(request, self.config.timeout()).await?;
        self.advance(Stage::ResponseReceived);
        info!("Final URL after redirects: {}", outcome.final_url);

        let redirects = history.redirects.len();
        let jar = Arc::new(jar);
        let errors = persist(
            &outcome,
            Arc::clone(&jar),
            history,
            &self.config.artifact_paths(),
        )
        .await;
        if !errors.is_empty() {
            for err in &errors {
                error!("{err}");
            }
            return Err(FetchError::Persist(errors));
        }
        self.advance(Stage::ArtifactsPersisted);

        let session_name = &self.config.session_cookie;
        let session_cookie =
            cookies::resolve(&jar, &outcome.set_cookies, session_name).map(str::to_string);
        match session_cookie.as_deref() {
            Some(value) if !value.is_empty() => info!("Found {session_name} cookie: {value}"),
            _ => warn!("No {session_name} cookie found"),
        }

        let result = if outcome.is_ok() {
            Outcome::Success
        } else {
            Outcome::Warning(WarningReason::UnexpectedStatus(outcome.status_code))
        };

        let mut report = RunReport::new(result, self.stage, started);
        report.status_code = Some(outcome.status_code);
        report.final_url = Some(outcome.final_url);
        report.redirects = redirects;
        report.session_cookie = session_cookie;

        info!(
            "Request completed with status {} in {:.2}s",
            outcome.status_code,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }
}
