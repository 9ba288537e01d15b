use miette::Diagnostic;
use thiserror::Error;

/// Errors from building filters, querying the catalog, or selecting the
/// newest version.
#[derive(Debug, Diagnostic, Error)]
pub enum RepologyError {
    #[error("invalid repology filter `{entry}`")]
    #[diagnostic(help(
        "use the `filter: value` format, with a single space after the colon. Example: `project: emacs`"
    ))]
    InvalidFilter { entry: String },

    #[error("unknown repology filter `{key}`")]
    #[diagnostic(help(
        "use one of `project`, `repo`, `subrepo`, `name`, `srcname`, `binname`, `visiblename`, \
         `version`, `origversion`, `status`, `summary`, `strip-prefix`, `strip-suffix`"
    ))]
    UnknownFilter { key: String },

    #[error("invalid repology status `{value}`")]
    #[diagnostic(help(
        "use one of `newest`, `devel`, `unique`, `outdated`, `legacy`, `rolling`, `noscheme`, \
         `incorrect`, `untrusted`, `ignored`"
    ))]
    UnknownStatus { value: String },

    #[error("repology filters do not declare `{key}`")]
    #[diagnostic(help("add a `{key}: ...` entry to the `repology` array"))]
    MissingFilter { key: &'static str },

    #[error("repology is unreachable")]
    #[diagnostic(help(
        "check the network and the configured repology URL; the run is aborted rather than \
         reported as up-to-date"
    ))]
    Unreachable {
        #[source]
        source: reqwest::Error,
    },

    #[error("no repology candidate matched the filters for `{project}`")]
    #[diagnostic(help(
        "the declared filters excluded every record returned for the project; loosen `repo` or \
         `status`, or check the project name"
    ))]
    NoMatchingVersion { project: String },
}
