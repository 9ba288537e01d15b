//! Field extraction over the pacscript line store.
//!
//! Pacscripts are shell-assignment text, but only the documented subset is
//! understood here: scalar assignments, array assignments spanning one or
//! more lines, and per-architecture `_<arch>` name suffixes. Anything beyond
//! that (notably values that expand `$`-expressions) is handed to
//! [`eval`](self::eval) instead of being interpreted in place.

pub mod errors;
pub mod eval;

use log::{debug, trace};
use regex::Regex;

use self::errors::ParseError;
use crate::document::Document;
use crate::model::HashKind;

/// One element of an array field, remembering where it came from so a
/// rewrite can be scoped to exactly this element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayEntry {
    /// Zero-indexed document line the element starts on.
    pub line: usize,
    /// The element text as written, quotes included.
    pub raw: String,
    /// The unquoted element value.
    pub value: String,
}

/// An array field after name resolution, carrying the field name that
/// actually matched (the arch-qualified name or its base fallback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArray {
    pub field: String,
    pub entries: Vec<ArrayEntry>,
}

impl ResolvedArray {
    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.value.clone()).collect()
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Locate `name=` at the start of a line, returning the line index and the
/// byte offset just past the `=`.
///
/// The name is matched whole: `pkgver=` never matches a `pkgver_extra=`
/// assignment, and an indented assignment is still found.
fn assignment(doc: &Document, name: &str) -> Option<(usize, usize)> {
    let head = Regex::new(&format!(r"^\s*{}=", regex::escape(name))).unwrap();

    doc.lines()
        .iter()
        .enumerate()
        .find_map(|(index, line)| head.find(line).map(|found| (index, found.end())))
}

/// Extract a scalar assignment of the form `name=value`, where the value may
/// be single-quoted, double-quoted or bare. Returns [`None`] if no such
/// assignment exists.
pub fn scalar(doc: &Document, name: &str) -> Option<String> {
    scalar_entry(doc, name).map(|(_, value)| value)
}

/// Like [`scalar`], but also reports the zero-indexed line the assignment
/// lives on, for callers that will patch it later.
pub fn scalar_entry(doc: &Document, name: &str) -> Option<(usize, String)> {
    let (line, column) = assignment(doc, name)?;
    trace!("found scalar `{name}` on line {}", line + 1);

    Some((line, first_token(&doc.lines()[line][column..])))
}

/// Extract an array assignment `name=(...)`, whose body may span several
/// lines.
///
/// # Errors
///
/// [`ParseError::UnterminatedArray`] if the body never closes.
pub fn array(doc: &Document, name: &str) -> Result<Option<ResolvedArray>, ParseError> {
    let head = Regex::new(&format!(r"^\s*{}=\(", regex::escape(name))).unwrap();

    let Some((line, column)) = doc
        .lines()
        .iter()
        .enumerate()
        .find_map(|(index, line)| head.find(line).map(|found| (index, found.end())))
    else {
        return Ok(None);
    };

    let entries = array_body(doc, name, line, column)?;
    debug!("array `{name}`: {} elements", entries.len());

    Ok(Some(ResolvedArray {
        field: name.to_owned(),
        entries,
    }))
}

/// Extract `base_<arch>=(...)`, falling back to `base=(...)` when the
/// qualified name is absent. Returns [`None`] when neither exists; callers
/// decide whether that is fatal.
pub fn arch_array(
    doc: &Document,
    base: &str,
    arch: &str,
) -> Result<Option<ResolvedArray>, ParseError> {
    if let Some(qualified) = array(doc, &format!("{base}_{arch}"))? {
        return Ok(Some(qualified));
    }

    array(doc, base)
}

/// Extract the digest array for one hash algorithm, `<kind>sums[_<arch>]`,
/// with the same fallback rule as [`arch_array`].
pub fn sum_array(
    doc: &Document,
    kind: HashKind,
    arch: &str,
) -> Result<Option<ResolvedArray>, ParseError> {
    arch_array(doc, &format!("{kind}sums"), arch)
}

/// Walk the array body from just past the opening parenthesis, producing
/// whitespace-separated, quote-aware tokens until the unescaped closing
/// parenthesis.
fn array_body(
    doc: &Document,
    field: &str,
    start: usize,
    column: usize,
) -> Result<Vec<ArrayEntry>, ParseError> {
    let mut entries = Vec::new();
    let mut raw = String::new();
    let mut value = String::new();
    let mut token_line = start;
    let (mut in_single, mut in_double) = (false, false);

    let mut line_index = start;
    let mut offset = column;

    while line_index < doc.lines().len() {
        let line = &doc.lines()[line_index];
        let mut chars = line[offset..].chars();

        while let Some(character) = chars.next() {
            if raw.is_empty() {
                token_line = line_index;
            }

            match character {
                '\'' if !in_double => {
                    in_single = !in_single;
                    raw.push(character);
                },
                '"' if !in_single => {
                    in_double = !in_double;
                    raw.push(character);
                },
                '\\' if !in_single => {
                    raw.push(character);
                    if let Some(escaped) = chars.next() {
                        raw.push(escaped);
                        value.push(escaped);
                    }
                },
                ')' if !in_single && !in_double => {
                    flush(&mut entries, token_line, &mut raw, &mut value);
                    return Ok(entries);
                },
                '#' if !in_single && !in_double && raw.is_empty() => break,
                character if character.is_whitespace() && !in_single && !in_double => {
                    flush(&mut entries, token_line, &mut raw, &mut value);
                },
                character => {
                    raw.push(character);
                    value.push(character);
                },
            }
        }

        // End of line: a token boundary outside quotes, part of the value
        // inside them.
        if in_single || in_double {
            raw.push('\n');
            value.push('\n');
        } else {
            flush(&mut entries, token_line, &mut raw, &mut value);
        }

        line_index += 1;
        offset = 0;
    }

    Err(ParseError::UnterminatedArray {
        field: field.to_owned(),
        line: start + 1,
    })
}

fn flush(entries: &mut Vec<ArrayEntry>, line: usize, raw: &mut String, value: &mut String) {
    if raw.is_empty() {
        return;
    }

    entries.push(ArrayEntry {
        line,
        raw: std::mem::take(raw),
        value: std::mem::take(value),
    });
}

/// Decode the first shell word of a scalar value, honoring quotes and
/// stopping at unquoted whitespace or a comment.
fn first_token(rest: &str) -> String {
    let mut value = String::new();
    let (mut in_single, mut in_double) = (false, false);
    let mut chars = rest.chars();

    while let Some(character) = chars.next() {
        match character {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '\\' if !in_single => {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            },
            '#' if !in_single && !in_double && value.is_empty() => break,
            character if character.is_whitespace() && !in_single && !in_double => break,
            character => value.push(character),
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn doc(text: &str) -> Document { Document::new("test.pacscript", text) }

    #[rstest]
    #[case("pkgver=\"1.0.0\"", "1.0.0")]
    #[case("pkgver='1.0.0'", "1.0.0")]
    #[case("pkgver=1.0.0", "1.0.0")]
    #[case("pkgver=1.0.0 # current upstream", "1.0.0")]
    #[case("pkgver=\"1.0 beta\"", "1.0 beta")]
    fn scalar_unquotes_values(#[case] line: &str, #[case] expected: &str) {
        let doc = doc(&format!("pkgname=\"potato\"\n{line}\n"));
        assert_eq!(scalar(&doc, "pkgver").unwrap(), expected);
    }

    #[rstest]
    fn scalar_requires_the_whole_name() {
        let doc = doc("pkgver_extra=\"2.0\"\nmypkgver=\"3.0\"\n");
        assert_eq!(scalar(&doc, "pkgver"), None);
    }

    #[rstest]
    fn scalar_is_independent_of_surrounding_lines() {
        let doc = doc("# a comment\narch=('any')\npkgver=\"1.0\"\nsource=(\"x\")\n");
        assert_eq!(scalar(&doc, "pkgver").unwrap(), "1.0");
        assert_eq!(scalar_entry(&doc, "pkgver").unwrap().0, 2);
    }

    #[rstest]
    fn array_on_one_line() {
        let doc = doc("arch=('any' \"amd64\" arm64)\n");
        let array = array(&doc, "arch").unwrap().unwrap();
        assert_eq!(array.values(), vec!["any", "amd64", "arm64"]);
    }

    #[rstest]
    fn array_spanning_lines_preserves_order_and_location() {
        let doc = doc("source=(\n\t\"https://a.tar.gz\"\n\t\"https://b.tar.gz\" # mirror\n)\n");
        let array = array(&doc, "source").unwrap().unwrap();

        assert_eq!(array.values(), vec!["https://a.tar.gz", "https://b.tar.gz"]);
        assert_eq!(array.entries[0].line, 1);
        assert_eq!(array.entries[1].line, 2);
        assert_eq!(array.entries[1].raw, "\"https://b.tar.gz\"");
    }

    #[rstest]
    fn array_tolerates_comment_lines_in_the_body() {
        let doc = doc("sha256sums=(\n\t'aaaa'\n\t# second artifact\n\t'bbbb'\n)\n");
        let array = array(&doc, "sha256sums").unwrap().unwrap();
        assert_eq!(array.values(), vec!["aaaa", "bbbb"]);
    }

    #[rstest]
    fn array_keeps_quoted_parentheses() {
        let doc = doc("source=(\"https://x/download(1).tar.gz\")\n");
        let array = array(&doc, "source").unwrap().unwrap();
        assert_eq!(array.values(), vec!["https://x/download(1).tar.gz"]);
    }

    #[rstest]
    fn unterminated_array_is_a_hard_error() {
        let doc = doc("source=(\n\t\"https://a.tar.gz\"\n");
        let error = array(&doc, "source").unwrap_err();
        assert_eq!(
            error,
            ParseError::UnterminatedArray {
                field: "source".into(),
                line: 1,
            }
        );
    }

    #[rstest]
    fn missing_array_is_not_an_error() {
        let doc = doc("pkgname=\"potato\"\n");
        assert_eq!(array(&doc, "source").unwrap(), None);
    }

    #[rstest]
    fn arch_array_prefers_the_qualified_name() {
        let doc = doc("source=(\"generic\")\nsource_amd64=(\"specific\")\n");
        let array = arch_array(&doc, "source", "amd64").unwrap().unwrap();
        assert_eq!(array.field, "source_amd64");
        assert_eq!(array.values(), vec!["specific"]);
    }

    #[rstest]
    fn arch_array_falls_back_to_the_base_name() {
        let doc = doc("source=(\"generic\")\n");
        let array = arch_array(&doc, "source", "amd64").unwrap().unwrap();
        assert_eq!(array.field, "source");
        assert_eq!(array.values(), vec!["generic"]);
    }

    #[rstest]
    fn sum_array_resolves_like_sources() {
        let doc = doc("sha256sums=('aa')\nsha256sums_arm64=('bb')\n");

        let base = sum_array(&doc, HashKind::Sha256, "amd64").unwrap().unwrap();
        assert_eq!(base.field, "sha256sums");
        assert_eq!(base.values(), vec!["aa"]);

        let qualified = sum_array(&doc, HashKind::Sha256, "arm64").unwrap().unwrap();
        assert_eq!(qualified.field, "sha256sums_arm64");
        assert_eq!(qualified.values(), vec!["bb"]);
    }

    #[rstest]
    fn reextraction_is_idempotent() {
        let doc = doc("depends=(\n\t'a'\n\t'b'\n\t'c'\n)\n");
        let first = array(&doc, "depends").unwrap().unwrap();
        let second = array(&doc, "depends").unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.values(), vec!["a", "b", "c"]);
    }
}
