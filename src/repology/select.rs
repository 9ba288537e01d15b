//! Reduction of catalog records to the single newest version.

use log::debug;

use super::errors::RepologyError;
use super::filters::FilterKey;
use super::{CatalogRecord, FilterSet};
use crate::version::PkgVersion;

/// Select the newest qualifying version among `candidates`.
///
/// Records are kept when they satisfy every record-level filter (the `repo`
/// constraint is mandatory), their version strings are passed through the
/// declared `strip-prefix`/`strip-suffix` transforms, and the maximum under
/// debian-style ordering wins. When two candidates transform to the same
/// string either may be returned; the result is identical.
///
/// # Errors
///
/// * [`RepologyError::MissingFilter`] when no `repo` filter is declared.
/// * [`RepologyError::NoMatchingVersion`] when the surviving set is empty.
///   The current version is never returned as a fallback; "nothing matched"
///   and "already up to date" are different answers.
pub fn select(candidates: &[CatalogRecord], filters: &FilterSet) -> Result<String, RepologyError> {
    filters.repo()?;

    let survivors: Vec<String> = candidates
        .iter()
        .filter(|record| filters.matches(record))
        .map(|record| transform(&record.version, filters))
        .collect();

    debug!(
        "{} of {} candidates survive the filters",
        survivors.len(),
        candidates.len()
    );

    survivors
        .into_iter()
        .max_by(|left, right| PkgVersion::new(left).cmp(&PkgVersion::new(right)))
        .ok_or_else(|| RepologyError::NoMatchingVersion {
            project: filters
                .get(FilterKey::Project)
                .unwrap_or_default()
                .to_owned(),
        })
}

fn transform(version: &str, filters: &FilterSet) -> String {
    let mut version = version;

    if let Some(prefix) = filters.get(FilterKey::StripPrefix) {
        version = version.strip_prefix(prefix).unwrap_or(version);
    }
    if let Some(suffix) = filters.get(FilterKey::StripSuffix) {
        version = version.strip_suffix(suffix).unwrap_or(version);
    }

    version.to_owned()
}
