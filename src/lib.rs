//! `clearfetch` - one fingerprinted fetch with captured session cookies
//!
//! # Features
//!
//! - **Cookie replay**: sends the jar captured by a real browser session
//! - **Exact fingerprint**: the capturing browser's headers, byte for byte
//! - **Redirect capture**: every followed hop is recorded
//! - **Artifact fan-out**: body, redirect history and merged cookies written concurrently
//!
//! # Example
//!
//! ```rust,no_run
//! use clearfetch::{Config, Outcome, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut pipeline = Pipeline::new(Config::load()?)?;
//!     let report = pipeline.run("https://shop.example/basket").await?;
//!     if report.outcome == Outcome::Success {
//!         println!("Fetched {:?}", report.final_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod cookies;
pub mod error;
pub mod fingerprint;
pub mod http_client;
pub mod persist;
pub mod pipeline;
pub mod redirect;
pub mod request;

pub use config::{ArtifactNames, ArtifactPaths, Config, PoolConfig};
pub use cookies::{Cookie, CookieJar, CookieStatus, PersistedCookie, PersistedJar};
pub use error::{Artifact, FetchError, PersistError, Result};
pub use fingerprint::BrowserProfile;
pub use http_client::{RequestOutcome, SessionClient};
pub use persist::persist;
pub use pipeline::{Outcome, Pipeline, RunReport, Stage, WarningReason};
pub use redirect::{RedirectHistory, RedirectHop};
