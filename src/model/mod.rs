//! Typed view over a parsed pacscript.

mod pacscript;

pub use pacscript::{HashKind, Pacscript, SourceEntry, SKIP_SUM};
