//! Backend API library for Pacup, the Pacstall pacscript updater.
//!
//! Pacup takes a pacscript, asks [Repology](https://repology.org) what the
//! newest upstream version of the packaged project is, and rewrites the
//! script in place: new `pkgver`, refetched sources, recomputed digests.
//! This crate is the logic behind that; the binary on top of it is
//! option-parsing and orchestration.
//!
//! The building blocks, leaf first:
//!
//! * [`document`] — the line store one pacscript is parsed from and patched
//!   into.
//! * [`parser`] — field extraction over the line store, plus subshell
//!   evaluation of dynamic values in [`parser::eval`].
//! * [`model`] — the typed view: [`model::Pacscript`],
//!   [`model::SourceEntry`], [`model::HashKind`].
//! * [`version`] — debian-style version ordering.
//! * [`repology`] — filter building, the catalog client, and newest-version
//!   selection.
//! * [`update`] — the pipeline gluing those together, and the scoped
//!   `pkgver`/digest rewrites.
//! * [`config`] — figment-backed configuration, passed explicitly into the
//!   entry points that need it.

use miette::Diagnostic;
use thiserror::Error;

pub mod config;
pub mod document;
pub mod model;
pub mod parser;
pub mod repology;
pub mod update;
pub mod version;

pub use config::Config;
pub use document::Document;
pub use model::Pacscript;
pub use repology::Client;
pub use update::Outcome;

/// Any failure a per-document run can end with. Nothing is recovered
/// internally; each stage's error carries the context (field name,
/// expression text, filter key) needed to diagnose it without re-reading
/// the document.
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] parser::errors::ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] parser::eval::EvalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repology(#[from] repology::errors::RepologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Patch(#[from] document::PatchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Update(#[from] update::UpdateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
