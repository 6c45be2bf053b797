//! In-archive path composition.
//!
//! Archive paths are kept as a list of normalized segments and rendered with
//! forward slashes regardless of the host separator. Host paths are rebuilt
//! from the same segments with `Path::join`, so the two conventions never mix.

use crate::PackError;
use crate::Result;
use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// A separator-independent path inside the archive.
///
/// # Examples
///
/// ```
/// use distpack_core::path::ArchivePath;
///
/// let path = ArchivePath::from_segments(["assets", "logo.svg"]);
/// assert_eq!(path.file_name(), "assets/logo.svg");
/// assert_eq!(path.parent().dir_name(), "assets/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchivePath {
    segments: Vec<String>,
}

impl ArchivePath {
    /// Returns the empty path (the archive root).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the archive-relative path of an entry found `depth` levels below
    /// the traversal root.
    ///
    /// Only the trailing `depth` components of `path` are kept, so the root
    /// directory's own segments (however many there are) are stripped.
    ///
    /// # Panics
    ///
    /// Panics if `path` has fewer than `depth` components. The walker always
    /// reports a depth no larger than its path, so this is a programming error.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::path::ArchivePath;
    /// use std::path::Path;
    ///
    /// let path = ArchivePath::from_walk(Path::new("build/dist/js/app.js"), 2);
    /// assert_eq!(path.file_name(), "js/app.js");
    /// ```
    #[must_use]
    pub fn from_walk(path: &Path, depth: usize) -> Self {
        let total = path.components().count();
        assert!(
            depth <= total,
            "walk depth {depth} exceeds the {total} components of {}",
            path.display()
        );
        Self::from_host_relative(strip_leading_segments(path, total - depth))
    }

    /// Converts a relative host path into archive segments.
    ///
    /// `.` components are dropped; names that are not valid UTF-8 are
    /// converted lossily.
    #[must_use]
    pub fn from_host_relative(path: &Path) -> Self {
        Self::from_segments(path.components().filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }))
    }

    /// Returns a new path with `name` appended.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Returns the parent path; the root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Returns `self` followed by every segment of `other`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns `true` for the archive root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the normalized segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns every non-root ancestor of this path, outermost first, ending
    /// with the path itself.
    ///
    /// ```
    /// use distpack_core::path::ArchivePath;
    ///
    /// let dirs: Vec<_> = ArchivePath::from_segments(["a", "b"])
    ///     .ancestors()
    ///     .map(|p| p.dir_name())
    ///     .collect();
    /// assert_eq!(dirs, ["a/", "a/b/"]);
    /// ```
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (1..=self.segments.len())
            .map(|len| Self::from_segments(self.segments[..len].iter().cloned()))
    }

    /// Renders the path as a ZIP file entry name (`a/b/c.txt`).
    #[must_use]
    pub fn file_name(&self) -> String {
        self.segments.join("/")
    }

    /// Renders the path as a ZIP directory entry name (`a/b/`).
    #[must_use]
    pub fn dir_name(&self) -> String {
        let mut name = self.file_name();
        name.push('/');
        name
    }

    /// Rebuilds the host path of this entry under `base`, using the host
    /// separator.
    #[must_use]
    pub fn to_host_path(&self, base: &Path) -> PathBuf {
        self.segments
            .iter()
            .fold(base.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Removes the first `count` components of `path`.
///
/// Root and prefix components count as segments, so stripping one segment from
/// `/srv/dist` yields `srv/dist`.
///
/// # Panics
///
/// Panics if `count` exceeds the number of components in `path`.
///
/// # Examples
///
/// ```
/// use distpack_core::path::strip_leading_segments;
/// use std::path::Path;
///
/// assert_eq!(strip_leading_segments(Path::new("dist/css/app.css"), 1), Path::new("css/app.css"));
/// ```
#[must_use]
pub fn strip_leading_segments(path: &Path, count: usize) -> &Path {
    let mut components = path.components();
    for index in 0..count {
        assert!(
            components.next().is_some(),
            "cannot strip segment {index} of {}: index out of range",
            path.display()
        );
    }
    components.as_path()
}

/// A validated, relative path prefix under which every entry is nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    path: ArchivePath,
}

impl PathPrefix {
    /// Parses and validates a configured prefix.
    ///
    /// Both `/` and `\` separate segments; empty and `.` segments are dropped.
    /// Returns `Ok(None)` when nothing remains.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidPathPrefix`] if the prefix is absolute
    /// (rooted, drive-qualified or UNC) or contains a `..` segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::path::PathPrefix;
    ///
    /// let prefix = PathPrefix::parse("app\\v1/").unwrap().unwrap();
    /// assert_eq!(prefix.as_archive_path().file_name(), "app/v1");
    ///
    /// assert!(PathPrefix::parse("").unwrap().is_none());
    /// assert!(PathPrefix::parse("/abs/prefix").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        if is_absolute(raw) {
            return Err(PackError::InvalidPathPrefix {
                prefix: raw.to_string(),
                reason: "absolute paths are not allowed".to_string(),
            });
        }

        let mut segments = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(PackError::InvalidPathPrefix {
                        prefix: raw.to_string(),
                        reason: "'..' segments are not allowed".to_string(),
                    });
                }
                name => segments.push(name.to_string()),
            }
        }

        if segments.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            path: ArchivePath { segments },
        }))
    }

    /// Returns the prefix as an archive path.
    #[must_use]
    pub fn as_archive_path(&self) -> &ArchivePath {
        &self.path
    }
}

/// Composes the in-archive path of an entry from the optional prefix and the
/// entry's path relative to the input root.
#[must_use]
pub fn compose(prefix: Option<&PathPrefix>, relative: &ArchivePath) -> ArchivePath {
    match prefix {
        Some(prefix) => prefix.path.join(relative),
        None => relative.clone(),
    }
}

fn is_absolute(raw: &str) -> bool {
    if raw.starts_with(['/', '\\']) || Path::new(raw).is_absolute() {
        return true;
    }
    // Drive-qualified paths ("C:\", "C:foo") are rooted on Windows hosts and
    // meaningless in an archive on any host.
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
