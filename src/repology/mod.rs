//! Version resolution against the Repology catalog.
//!
//! A pacscript declares how it is tracked upstream through its
//! `repology=(...)` array. That metadata becomes a [`FilterSet`], the
//! [`Client`] asks Repology which versions of the project exist across
//! distribution repositories, and [`select`] reduces the answer to the one
//! newest version string worth comparing against `pkgver`.

pub mod client;
pub mod errors;
pub mod filters;
pub mod select;

pub use client::Client;
pub use errors::RepologyError;
pub use filters::{FilterKey, FilterSet};
pub use select::select;

use serde::Deserialize;
use strum::{Display, EnumString};

/// Repology's per-record status marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RepologyStatus {
    Newest,
    Devel,
    Unique,
    Outdated,
    Legacy,
    Rolling,
    NoScheme,
    Incorrect,
    Untrusted,
    Ignored,
}

/// One record returned by the catalog for the queried project: which
/// repository carries it, under which names, at which version, with which
/// status. Unknown response fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogRecord {
    pub repo: String,
    #[serde(default)]
    pub subrepo: Option<String>,
    #[serde(default)]
    pub srcname: Option<String>,
    #[serde(default)]
    pub binname: Option<String>,
    #[serde(default)]
    pub visiblename: Option<String>,
    pub version: String,
    #[serde(default)]
    pub origversion: Option<String>,
    #[serde(default)]
    pub status: Option<RepologyStatus>,
    #[serde(default)]
    pub summary: Option<String>,
}
