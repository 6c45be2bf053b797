//! Include/exclude decisions for traversal entries.
//!
//! The walker asks an [`EntryFilter`] about every file and directory it
//! reaches. Rejecting a directory prunes its whole subtree: the filter is never
//! consulted for its descendants.

use std::path::Path;

/// Decides whether a traversal entry is packed.
///
/// Implemented for any `Fn(&str, &Path, bool) -> bool`, so closures can be
/// used directly.
///
/// # Examples
///
/// ```
/// use distpack_core::filter::EntryFilter;
/// use std::path::Path;
///
/// let skip_config = |_name: &str, path: &Path, _is_dir: bool| {
///     !path.to_string_lossy().contains("config")
/// };
/// assert!(skip_config.include("a.txt", Path::new("dist/a.txt"), false));
/// assert!(!skip_config.include("config", Path::new("dist/config"), true));
/// ```
pub trait EntryFilter: Send + Sync {
    /// Returns `true` if the entry should be included.
    ///
    /// * `name` - base name of the entry
    /// * `path` - path of the entry as reached from the input directory
    /// * `is_dir` - whether the entry is a directory
    fn include(&self, name: &str, path: &Path, is_dir: bool) -> bool;
}

impl<F> EntryFilter for F
where
    F: Fn(&str, &Path, bool) -> bool + Send + Sync,
{
    fn include(&self, name: &str, path: &Path, is_dir: bool) -> bool {
        self(name, path, is_dir)
    }
}

/// Filter that includes every entry. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl EntryFilter for AcceptAll {
    fn include(&self, _name: &str, _path: &Path, _is_dir: bool) -> bool {
        true
    }
}

/// Excludes entries by glob-style pattern and, optionally, hidden entries.
///
/// Patterns are matched against the entry name; excluding a directory prunes
/// everything below it:
/// - exact match: `".git"` matches only `.git`
/// - extension wildcard: `"*.map"` matches names ending with `.map`
/// - prefix wildcard: `"tmp*"` matches names starting with `tmp`
///
/// # Examples
///
/// ```
/// use distpack_core::filter::EntryFilter;
/// use distpack_core::filter::PatternFilter;
/// use std::path::Path;
///
/// let filter = PatternFilter::new(["*.map", "config"]);
/// assert!(filter.include("app.js", Path::new("dist/app.js"), false));
/// assert!(!filter.include("app.js.map", Path::new("dist/app.js.map"), false));
/// assert!(!filter.include("config", Path::new("dist/config"), true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    patterns: Vec<String>,
    skip_hidden: bool,
}

impl PatternFilter {
    /// Creates a filter excluding the given patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            skip_hidden: false,
        }
    }

    /// Sets whether entries whose name starts with `.` are excluded.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Returns the exclude patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl EntryFilter for PatternFilter {
    fn include(&self, name: &str, _path: &Path, _is_dir: bool) -> bool {
        if self.skip_hidden && is_hidden(name) {
            return false;
        }
        !self
            .patterns
            .iter()
            .any(|pattern| pattern_matches(name, pattern))
    }
}

/// Returns `true` if the name starts with `.`.
///
/// ```
/// use distpack_core::filter::is_hidden;
///
/// assert!(is_hidden(".env"));
/// assert!(!is_hidden("index.html"));
/// ```
#[must_use]
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Matches a string against a simple glob pattern.
fn pattern_matches(s: &str, pattern: &str) -> bool {
    if pattern == s {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return s.starts_with(prefix);
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        return s.ends_with(suffix);
    }

    false
}
