//! The blocking HTTP client for the Repology project API.

use std::time::Duration;

use log::debug;
use reqwest::blocking;

use super::errors::RepologyError;
use super::{CatalogRecord, FilterSet};
use crate::config::Config;

/// A thin client over `GET /api/v1/project/{project}`.
///
/// Exactly one round trip per [`query`](Client::query), no retries, bounded
/// by the configured timeout. Failure is always surfaced as
/// [`RepologyError::Unreachable`] rather than an empty candidate list, so an
/// outage can never masquerade as "already up to date".
#[derive(Debug)]
pub struct Client {
    http: blocking::Client,
    base_url: String,
}

impl Client {
    /// Build a client against `base_url` (e.g. `https://repology.org`).
    ///
    /// # Errors
    ///
    /// [`RepologyError::Unreachable`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepologyError> {
        let http = blocking::Client::builder()
            .user_agent(concat!("pacup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| RepologyError::Unreachable { source })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Build a client from the extracted [`Config`].
    ///
    /// # Errors
    ///
    /// Same as [`Client::new`].
    pub fn from_config(config: &Config) -> Result<Self, RepologyError> {
        Self::new(&config.repology.url, config.http_timeout())
    }

    /// Query the catalog for the project named by the filter set.
    ///
    /// The response ordering is preserved; nothing is filtered or re-sorted
    /// here, that is [`select`](super::select)'s job.
    ///
    /// # Errors
    ///
    /// * [`RepologyError::MissingFilter`] when no `project` is declared.
    /// * [`RepologyError::Unreachable`] on transport failure, a non-success
    ///   status, or an undecodable body.
    pub fn query(&self, filters: &FilterSet) -> Result<Vec<CatalogRecord>, RepologyError> {
        let project = filters.project()?;
        let url = format!("{}/api/v1/project/{project}", self.base_url);
        debug!("querying {url}");

        let records: Vec<CatalogRecord> = self
            .http
            .get(&url)
            .send()
            .and_then(blocking::Response::error_for_status)
            .map_err(|source| RepologyError::Unreachable { source })?
            .json()
            .map_err(|source| RepologyError::Unreachable { source })?;

        debug!("repology returned {} records for `{project}`", records.len());
        Ok(records)
    }
}
