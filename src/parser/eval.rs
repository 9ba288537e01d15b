//! Evaluation of dynamic pacscript values.
//!
//! A value like `"https://potato.com/${pkgver}.tar.gz"` or `"$(latest_url)"`
//! cannot be read literally; it has to be expanded against the document's own
//! variable and function declarations. That is done the way the rest of the
//! Pacstall stack does it: source the pacscript in a bash subshell and print
//! the expanded expression, capturing stdout.
//!
//! This is a trust boundary. The pacscript author is trusted (their code runs
//! in the subshell either way once the package builds); the upstream catalog
//! response is not, and nothing from it is ever evaluated here. The subshell
//! runs with a scrubbed environment and a bounded timeout.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;

use log::trace;
use miette::Diagnostic;
use thiserror::Error;
use wait_timeout::ChildExt;

use crate::document::Document;

#[derive(Debug, Diagnostic, Error)]
pub enum EvalError {
    #[error("failed to spawn bash to evaluate `{expression}`")]
    #[diagnostic(help("bash must be installed and on the PATH"))]
    Spawn {
        expression: String,
        #[source]
        source: std::io::Error,
    },

    #[error("evaluating `{expression}` timed out after {}s", .timeout.as_secs())]
    #[diagnostic(help("the expression ran too long; raise the eval timeout if it is legitimate"))]
    Timeout {
        expression: String,
        timeout: Duration,
    },

    #[error("evaluating `{expression}` failed{}", .code.map(|code| format!(" with exit code {code}")).unwrap_or_default())]
    #[diagnostic(help("sourcing the pacscript or expanding the expression returned non-zero"))]
    Failed {
        expression: String,
        code: Option<i32>,
    },

    #[error("evaluating `{expression}` produced no output")]
    #[diagnostic(help("the expression expanded to an empty string; check the variables it references"))]
    Empty { expression: String },

    #[error("output of `{expression}` is not valid UTF-8")]
    NonUtf8 { expression: String },
}

/// Whether a raw value needs shell expansion before use.
pub fn is_dynamic(value: &str) -> bool { value.contains('$') }

/// Resolve a possibly-dynamic value against the document.
///
/// Literal values are returned unchanged without spawning anything. Dynamic
/// values are expanded by sourcing the document in a subshell and printing
/// the expression; trailing newlines are stripped from the capture.
///
/// # Errors
///
/// Every failure mode names the offending expression: spawn failure,
/// timeout, non-zero exit, empty output, or non-UTF-8 output.
pub fn resolve(doc: &Document, value: &str, timeout: Duration) -> Result<String, EvalError> {
    if !is_dynamic(value) {
        return Ok(value.to_owned());
    }

    let expression = value.to_owned();
    let escaped = value.replace('\\', r"\\").replace('"', "\\\"");
    let script = format!("{}\nprintf '%s' \"{escaped}\"", doc.text());
    trace!("evaluating `{value}` in a subshell");

    let mut child = Command::new("bash")
        .args(["--noprofile", "--norc", "-c", &script])
        .env_clear()
        .env("PATH", "/usr/sbin:/usr/bin:/sbin:/bin")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| EvalError::Spawn {
            expression: expression.clone(),
            source,
        })?;

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EvalError::Timeout {
                expression,
                timeout,
            });
        },
        Err(source) => {
            let _ = child.kill();
            return Err(EvalError::Spawn { expression, source });
        },
    };

    let mut stdout = Vec::new();
    if let Some(mut pipe) = child.stdout.take() {
        let _ = pipe.read_to_end(&mut stdout);
    }

    if !status.success() {
        return Err(EvalError::Failed {
            expression,
            code: status.code(),
        });
    }

    let resolved = String::from_utf8(stdout)
        .map_err(|_| EvalError::NonUtf8 {
            expression: expression.clone(),
        })?
        .trim_end_matches('\n')
        .to_owned();

    if resolved.is_empty() {
        return Err(EvalError::Empty { expression });
    }

    trace!("`{value}` resolved to `{resolved}`");
    Ok(resolved)
}
