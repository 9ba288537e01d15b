//! The update pipeline: decide the newest upstream version for one
//! pacscript and rewrite it in place.
//!
//! Everything here composes the extraction, resolution and selection
//! building blocks; the surrounding orchestration (refetching artifacts,
//! recomputing digests, shipping the change) lives in the Pacup binary.

use log::{debug, info};
use miette::Diagnostic;

use crate::config::Config;
use crate::document::{Document, Patch};
use crate::model::{HashKind, Pacscript};
use crate::parser::errors::ParseError;
use crate::parser::{self, eval};
use crate::repology::{select, Client, FilterSet};
use crate::version::PkgVersion;
use crate::Error;

/// The result of one resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The catalog's newest qualifying version is not newer than `pkgver`;
    /// nothing is mutated.
    UpToDate,
    /// Upstream moved ahead; `newest` is what `pkgver` should become.
    Outdated { newest: String },
}

/// Rewrite errors not already covered by the patch layer.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum UpdateError {
    #[error("`{field}` has no element {index}")]
    #[diagnostic(help("the digest array is shorter than the source array it mirrors"))]
    NoSuchElement { field: String, index: usize },
}

/// Build the filter set for a document, resolving each raw `repology` entry
/// through the subshell first (filters may reference `$pkgname` and
/// friends).
///
/// # Errors
///
/// Evaluation and filter-building failures, each naming the offending
/// entry or key.
pub fn resolve_filters(
    doc: &Document,
    pacscript: &Pacscript,
    config: &Config,
) -> Result<FilterSet, Error> {
    let mut resolved = Vec::with_capacity(pacscript.repology.len());
    for entry in &pacscript.repology {
        resolved.push(eval::resolve(doc, entry, config.eval_timeout())?);
    }

    Ok(FilterSet::build(&resolved)?)
}

/// Resolve the newest upstream version for a document: extract, build
/// filters, query the catalog once, select.
///
/// # Errors
///
/// Any failure from the underlying stages, unrecovered.
pub fn newest_version(doc: &Document, client: &Client, config: &Config) -> Result<String, Error> {
    let pacscript = Pacscript::from_document(doc)?;
    let filters = resolve_filters(doc, &pacscript, config)?;
    let candidates = client.query(&filters)?;

    Ok(select(&candidates, &filters)?)
}

/// Resolve and compare against the current `pkgver`.
///
/// The same [`PkgVersion`] ordering used by selection decides "is this
/// actually newer", so the two stages cannot disagree. An equal or older
/// catalog version is a normal no-op, distinct from every error.
///
/// # Errors
///
/// Same as [`newest_version`].
pub fn check(doc: &Document, client: &Client, config: &Config) -> Result<Outcome, Error> {
    let pacscript = Pacscript::from_document(doc)?;
    let filters = resolve_filters(doc, &pacscript, config)?;
    let candidates = client.query(&filters)?;
    let newest = select(&candidates, &filters)?;

    if PkgVersion::is_newer(&newest, &pacscript.pkgver) {
        info!("{}: {} -> {newest}", pacscript.pkgname, pacscript.pkgver);
        Ok(Outcome::Outdated { newest })
    } else {
        debug!("{}: {} is up to date", pacscript.pkgname, pacscript.pkgver);
        Ok(Outcome::UpToDate)
    }
}

/// Replace the current `pkgver` value with `new_version`, touching only the
/// assignment line. An old version substring occurring anywhere else in the
/// document (a URL, a digest) is left alone.
///
/// # Errors
///
/// * [`ParseError::MissingField`] when the document has no `pkgver`.
/// * A patch error when the assignment line no longer carries the value.
pub fn bump_pkgver(doc: &mut Document, new_version: &str) -> Result<(), Error> {
    let (line, current) =
        parser::scalar_entry(doc, "pkgver").ok_or_else(|| ParseError::MissingField {
            field: "pkgver".into(),
        })?;

    doc.apply(&Patch {
        line,
        from: current,
        to: new_version.to_owned(),
    })?;

    Ok(())
}

/// Replace one digest in `<kind>sums[_<arch>]`, scoped to the element at
/// `index` so an identical digest elsewhere in the document is never
/// touched.
///
/// # Errors
///
/// * [`ParseError::MissingField`] when no sum array exists for the kind.
/// * [`UpdateError::NoSuchElement`] when the array is shorter than `index`.
/// * A patch error when the element's line changed underneath.
pub fn replace_sum(
    doc: &mut Document,
    kind: HashKind,
    arch: &str,
    index: usize,
    digest: &str,
) -> Result<(), Error> {
    let sums = parser::sum_array(doc, kind, arch)?.ok_or_else(|| ParseError::MissingField {
        field: format!("{kind}sums"),
    })?;

    let entry = sums
        .entries
        .get(index)
        .ok_or_else(|| UpdateError::NoSuchElement {
            field: sums.field.clone(),
            index,
        })?;

    doc.apply(&Patch {
        line: entry.line,
        from: entry.raw.clone(),
        to: requote(&entry.raw, digest),
    })?;

    Ok(())
}

/// Preserve the quoting style of the element being replaced.
fn requote(raw: &str, value: &str) -> String {
    if raw.starts_with('"') {
        format!("\"{value}\"")
    } else if raw.starts_with('\'') {
        format!("'{value}'")
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const POTATO: &str = r#"pkgname="potato"
pkgver="1.0"
arch=('amd64')
repology=("project: potato" "repo: debian")
source=("https://potato.com/${pkgver}/potato-1.0.tar.gz")
sha256sums=(
	'8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4'
	'8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4'
)
"#;

    fn doc() -> Document { Document::new("potato.pacscript", POTATO) }

    #[rstest]
    fn bump_pkgver_touches_only_the_assignment_line() {
        let mut doc = doc();
        bump_pkgver(&mut doc, "1.2").unwrap();

        assert_eq!(doc.lines()[1], "pkgver=\"1.2\"");
        // The literal old version inside the source URL is untouched.
        assert_eq!(
            doc.lines()[4],
            "source=(\"https://potato.com/${pkgver}/potato-1.0.tar.gz\")"
        );
    }

    #[rstest]
    fn bump_pkgver_without_the_field_fails() {
        let mut doc = Document::new("x.pacscript", "pkgname=\"x\"\n");
        let error = bump_pkgver(&mut doc, "1.2").unwrap_err();
        assert!(matches!(error, Error::Parse(ParseError::MissingField { .. })));
    }

    #[rstest]
    fn replace_sum_is_scoped_to_the_element_index() {
        let mut doc = doc();
        replace_sum(
            &mut doc,
            HashKind::Sha256,
            "amd64",
            1,
            "ab5df625bc76dbd4e163bed2dd888df828f90159bb93556525c31821b6541d46",
        )
        .unwrap();

        // Element 0 carries the same digest and must survive untouched.
        assert_eq!(
            doc.lines()[6],
            "\t'8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4'"
        );
        assert_eq!(
            doc.lines()[7],
            "\t'ab5df625bc76dbd4e163bed2dd888df828f90159bb93556525c31821b6541d46'"
        );
    }

    #[rstest]
    fn replace_sum_past_the_array_fails() {
        let mut doc = doc();
        let error = replace_sum(&mut doc, HashKind::Sha256, "amd64", 5, "abcd").unwrap_err();
        assert!(matches!(
            error,
            Error::Update(UpdateError::NoSuchElement { index: 5, .. })
        ));
    }

    #[rstest]
    fn replace_sum_without_an_array_fails() {
        let mut doc = doc();
        let error = replace_sum(&mut doc, HashKind::Md5, "amd64", 0, "abcd").unwrap_err();
        assert!(matches!(error, Error::Parse(ParseError::MissingField { .. })));
    }

    fn serve(server: &mut mockito::Server, body: &str) -> (Client, mockito::Mock) {
        let mock = server
            .mock("GET", "/api/v1/project/potato")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();

        let client = Client::new(&server.url(), std::time::Duration::from_secs(5)).unwrap();
        (client, mock)
    }

    #[rstest]
    fn check_reports_an_outdated_package() {
        let mut server = mockito::Server::new();
        let (client, _mock) = serve(
            &mut server,
            r#"[{"repo": "debian", "version": "1.2", "status": "newest"},
               {"repo": "fedora", "version": "9.9"}]"#,
        );

        let doc = doc();
        let outcome = check(&doc, &client, &Config::default()).unwrap();
        assert_eq!(
            outcome,
            Outcome::Outdated {
                newest: "1.2".into(),
            }
        );
    }

    #[rstest]
    fn check_is_a_no_op_when_current_matches_newest() {
        let mut server = mockito::Server::new();
        let (client, _mock) = serve(&mut server, r#"[{"repo": "debian", "version": "1.0"}]"#);

        let doc = doc();
        let before = doc.clone();
        let outcome = check(&doc, &client, &Config::default()).unwrap();

        assert_eq!(outcome, Outcome::UpToDate);
        assert_eq!(doc, before);
    }

    #[rstest]
    fn end_to_end_bump_rewrites_only_pkgver() {
        let mut server = mockito::Server::new();
        let (client, _mock) = serve(&mut server, r#"[{"repo": "debian", "version": "1.2"}]"#);

        let mut doc = doc();
        let Outcome::Outdated { newest } = check(&doc, &client, &Config::default()).unwrap()
        else {
            panic!("expected an update");
        };

        let before: Vec<String> = doc.lines().to_vec();
        bump_pkgver(&mut doc, &newest).unwrap();

        assert_eq!(doc.lines()[1], "pkgver=\"1.2\"");
        for (index, line) in doc.lines().iter().enumerate() {
            if index != 1 {
                assert_eq!(line, &before[index]);
            }
        }

        // A second resolution against the same catalog is now a no-op.
        let outcome = check(&doc, &client, &Config::default()).unwrap();
        assert_eq!(outcome, Outcome::UpToDate);
    }
}
