//! The line store backing one pacscript.
//!
//! A [`Document`] is the unit every extraction runs over and the unit the
//! updater mutates in place. Rewrites go through line-indexed [`Patch`]es so
//! a substitution can never leak into an unrelated line that happens to
//! contain the same substring.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// An ordered sequence of text lines plus the origin path they came from.
///
/// Line order is preserved across every rewrite; the only mutation ever
/// performed is an in-line substring substitution via [`Document::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    lines: Vec<String>,
}

/// One targeted substitution: replace the first occurrence of `from` with
/// `to` on line `line` (zero-indexed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub line: usize,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Diagnostic, Error)]
pub enum PatchError {
    #[error("patch targets line {line} but the document has {len} lines")]
    #[diagnostic(help("the document changed underneath the patch; re-extract before patching"))]
    OutOfRange { line: usize, len: usize },

    #[error("line {line} does not contain `{from}`")]
    #[diagnostic(help("the old value was expected verbatim on this line; nothing was rewritten"))]
    TargetMissing { line: usize, from: String },
}

impl Document {
    /// Read a pacscript from `path`.
    ///
    /// # Errors
    ///
    /// Any [`io::Error`] from reading the file.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        Ok(Self::new(path, &text))
    }

    /// Build a document from in-memory text, keeping `path` as its identity.
    pub fn new(path: impl AsRef<Path>, text: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: text.lines().map(ToOwned::to_owned).collect(),
        }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn lines(&self) -> &[String] { &self.lines }

    /// The document rendered back to text, with the trailing newline the
    /// on-disk representation always carries.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Apply one [`Patch`], replacing the first occurrence of `patch.from`
    /// on the targeted line.
    ///
    /// # Errors
    ///
    /// * [`PatchError::OutOfRange`] if the line index is past the document.
    /// * [`PatchError::TargetMissing`] if the line does not contain the old
    ///   value; the document is left untouched.
    pub fn apply(&mut self, patch: &Patch) -> Result<(), PatchError> {
        let len = self.lines.len();
        let line = self.lines.get_mut(patch.line).ok_or(PatchError::OutOfRange {
            line: patch.line,
            len,
        })?;

        if !line.contains(&patch.from) {
            return Err(PatchError::TargetMissing {
                line: patch.line,
                from: patch.from.clone(),
            });
        }

        *line = line.replacen(&patch.from, &patch.to, 1);
        Ok(())
    }

    /// Write the document back to its origin path, verbatim.
    ///
    /// # Errors
    ///
    /// Any [`io::Error`] from writing the file.
    pub fn persist(&self) -> io::Result<()> { fs::write(&self.path, self.text()) }
}
