use miette::Diagnostic;
use thiserror::Error;

/// Malformed-document errors raised while extracting fields.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("required field `{field}` is missing")]
    #[diagnostic(help("declare `{field}=...` in the pacscript"))]
    MissingField { field: String },

    #[error("array `{field}` opened on line {line} is never terminated")]
    #[diagnostic(help("close the `{field}=(` block with an unescaped `)`"))]
    UnterminatedArray { field: String, line: usize },

    #[error("`{sums}` declares {found} digests but `{source}` has {expected} entries")]
    #[diagnostic(help(
        "every source entry needs a digest at the matching position; use `SKIP` to leave one unchecked"
    ))]
    SumCountMismatch {
        sums: String,
        source: String,
        found: usize,
        expected: usize,
    },
}
