//! # satcat environment state
//!
//! This module defines [`crate::env_state::TrackerEnv`], the **shared environment object** handed
//! to the catalog ingestion routines. It owns a persistent asynchronous **HTTP client** used to
//! query remote element-set providers (e.g. Celestrak `gp.php`).
//!
//! ## Structure
//!
//! ```text
//! TrackerEnv
//! └── http_client  (reqwest::Client, global timeout)
//! ```
//!
//! ## Notes
//!
//! - The client is cheap to clone (reference counted) and keeps its connection pool alive, so a
//!   single `TrackerEnv` should be reused for every ingestion of a run.
//! - HTTP status codes ≥ 400 are turned into errors, so a provider outage surfaces as a
//!   batch-fatal fetch failure instead of an empty or garbage payload.
use std::time::Duration;

use reqwest::Client;

use crate::satcat_errors::SatcatError;

/// This object is passed to the ingestion functions of the library
/// to provide access to external data sources.
///
/// # Fields
///
/// * `http_client` - A reqwest client used to make HTTP requests
#[derive(Debug, Clone)]
pub struct TrackerEnv {
    pub http_client: Client,
}

impl TrackerEnv {
    /// Create a new environment
    ///
    /// Arguments
    /// ---------
    /// * `timeout`: global timeout applied to every request of the client
    ///
    /// Return
    /// ------
    /// * A new environment, or the reqwest error if the TLS backend cannot be initialized
    pub fn new(timeout: Duration) -> Result<Self, SatcatError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(TrackerEnv { http_client })
    }

    /// GET the body of `url` as text, failing on transport errors and error statuses.
    pub(crate) async fn get_from_url(&self, url: &str) -> Result<String, reqwest::Error> {
        self.http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}
