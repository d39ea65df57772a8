//! Import rewriting for copied Python sources.
//!
//! Bundled templates are written as a package (`from .config import ...`),
//! but a generated project runs as a flat script directory, so relative
//! `from` imports become absolute ones.

use std::sync::OnceLock;

use regex::Regex;

fn relative_from() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^(\s*)from\s+\.+(\w)").expect("relative import pattern is valid")
    })
}

/// Rewrite `from .mod import x` and `from ..mod import x` to `from mod import x`.
///
/// Bare `from . import x` has no module to anchor on and is left untouched.
/// `import` statements without `from` are never relative in Python 3.
pub fn rewrite_relative_imports(source: &str) -> String {
    relative_from()
        .replace_all(source, "${1}from ${2}")
        .into_owned()
}

/// Check whether a source still contains relative `from` imports.
pub fn has_relative_imports(source: &str) -> bool {
    relative_from().is_match(source)
}
