//! The filter set declared by a pacscript's `repology=(...)` array.

use std::collections::HashMap;

use log::debug;
use strum::{Display, EnumString};

use super::errors::RepologyError;
use super::{CatalogRecord, RepologyStatus};

/// Every filter key a `repology` entry may declare. Most constrain the
/// records returned by the catalog; `project` names the project to query,
/// and `strip-prefix`/`strip-suffix` transform candidate version strings
/// before they are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FilterKey {
    Project,
    Repo,
    SubRepo,
    Name,
    SrcName,
    BinName,
    VisibleName,
    Version,
    OrigVersion,
    Status,
    Summary,
    #[strum(serialize = "strip-prefix")]
    StripPrefix,
    #[strum(serialize = "strip-suffix")]
    StripSuffix,
}

/// A normalized, immutable set of filters: one value per key,
/// last-declared-wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    values: HashMap<FilterKey, String>,
    status: Option<RepologyStatus>,
}

impl FilterSet {
    /// Build the set from raw `key: value` entries. Callers resolve any
    /// dynamic entries through [`crate::parser::eval`] first.
    ///
    /// # Errors
    ///
    /// * [`RepologyError::InvalidFilter`] on malformed `key: value` syntax.
    /// * [`RepologyError::UnknownFilter`] on a key outside the vocabulary; a
    ///   typo'd filter silently changing which project is tracked is worse
    ///   than failing the run.
    /// * [`RepologyError::UnknownStatus`] on an unrecognized `status` value.
    pub fn build(entries: &[String]) -> Result<Self, RepologyError> {
        let mut set = Self::default();

        for entry in entries {
            let (key, value) = split_entry(entry)?;
            let key: FilterKey = key.parse().map_err(|_| RepologyError::UnknownFilter {
                key: key.clone(),
            })?;

            if key == FilterKey::Status {
                set.status = Some(value.parse().map_err(|_| RepologyError::UnknownStatus {
                    value: value.clone(),
                })?);
            }

            debug!("repology filter {key}: {value}");
            set.values.insert(key, value);
        }

        Ok(set)
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn status(&self) -> Option<RepologyStatus> { self.status }

    /// The project to query; mandatory.
    ///
    /// # Errors
    ///
    /// [`RepologyError::MissingFilter`] when undeclared.
    pub fn project(&self) -> Result<&str, RepologyError> {
        self.get(FilterKey::Project)
            .ok_or(RepologyError::MissingFilter { key: "project" })
    }

    /// The repository whose records are considered; mandatory.
    ///
    /// # Errors
    ///
    /// [`RepologyError::MissingFilter`] when undeclared.
    pub fn repo(&self) -> Result<&str, RepologyError> {
        self.get(FilterKey::Repo)
            .ok_or(RepologyError::MissingFilter { key: "repo" })
    }

    /// Whether a catalog record satisfies every declared record-level
    /// filter. The `repo` constraint is included; `project` and the version
    /// transforms are not record-level and are ignored here.
    pub fn matches(&self, record: &CatalogRecord) -> bool {
        if let Some(repo) = self.get(FilterKey::Repo) {
            if record.repo != repo {
                return false;
            }
        }

        if let Some(subrepo) = self.get(FilterKey::SubRepo) {
            if record.subrepo.as_deref() != Some(subrepo) {
                return false;
            }
        }

        // `name` is satisfied by whichever name field the repository exposes.
        if let Some(name) = self.get(FilterKey::Name) {
            let known = [&record.srcname, &record.binname, &record.visiblename];
            if !known.iter().any(|field| field.as_deref() == Some(name)) {
                return false;
            }
        }

        if let Some(srcname) = self.get(FilterKey::SrcName) {
            if record.srcname.as_deref() != Some(srcname) {
                return false;
            }
        }

        if let Some(binname) = self.get(FilterKey::BinName) {
            if record.binname.as_deref() != Some(binname) {
                return false;
            }
        }

        if let Some(visiblename) = self.get(FilterKey::VisibleName) {
            if record.visiblename.as_deref() != Some(visiblename) {
                return false;
            }
        }

        if let Some(version) = self.get(FilterKey::Version) {
            if record.version != version {
                return false;
            }
        }

        if let Some(origversion) = self.get(FilterKey::OrigVersion) {
            if record.origversion.as_deref() != Some(origversion) {
                return false;
            }
        }

        if let Some(summary) = self.get(FilterKey::Summary) {
            if record.summary.as_deref() != Some(summary) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if record.status != Some(status) {
                return false;
            }
        }

        true
    }
}

/// Validate one `key: value` entry the same way the rest of the Pacstall
/// tooling does: exactly one colon, no whitespace in the key, a single
/// mandatory space after the colon, and a non-empty whitespace-free value.
fn split_entry(entry: &str) -> Result<(String, String), RepologyError> {
    let split: Vec<&str> = entry.split(':').collect();

    if split.len() != 2 {
        return Err(RepologyError::InvalidFilter {
            entry: entry.to_owned(),
        });
    }

    let (key, raw_value) = (split[0], split[1]);

    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(RepologyError::InvalidFilter {
            entry: entry.to_owned(),
        });
    }

    let Some(value) = raw_value.strip_prefix(' ') else {
        return Err(RepologyError::InvalidFilter {
            entry: entry.to_owned(),
        });
    };

    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(RepologyError::InvalidFilter {
            entry: entry.to_owned(),
        });
    }

    Ok((key.to_owned(), value.to_owned()))
}
