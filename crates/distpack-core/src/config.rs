//! Configuration for pack runs.

use crate::PackError;
use crate::Result;
use crate::filter::AcceptAll;
use crate::filter::EntryFilter;
use crate::path::PathPrefix;
use chrono::FixedOffset;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for packing a directory into a ZIP archive.
///
/// Unset options keep the defaults listed on [`PackConfig::default`].
///
/// # Examples
///
/// ```
/// use distpack_core::PackConfig;
/// use distpack_core::PatternFilter;
///
/// let config = PackConfig::default()
///     .with_input_dir("build")
///     .with_output_file_name("site.zip")
///     .with_path_prefix("site/v1")
///     .with_filter(PatternFilter::new(["*.map"]));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.output_path(), std::path::Path::new("dist-zip/site.zip"));
/// ```
#[derive(Clone)]
pub struct PackConfig {
    /// Root of the tree to pack.
    pub input_dir: PathBuf,

    /// Directory the archive is written into. Created, with parents, if
    /// missing.
    pub output_dir: PathBuf,

    /// File name of the archive inside `output_dir`.
    pub output_file_name: String,

    /// Relative subpath under which every entry is nested. Empty means no
    /// nesting.
    pub path_prefix: String,

    /// Encrypts file entries with AES-256 when set.
    pub password: Option<String>,

    /// Include/exclude decision for every entry.
    pub filter: Arc<dyn EntryFilter>,

    /// Prints every step instead of a single completion line.
    pub enable_logging: bool,

    /// Follows symlinks to their targets. When disabled, symlinks are left
    /// out.
    pub follow_symlinks: bool,

    /// Offset used to turn modification times into ZIP wall-clock times.
    /// `None` uses the host's local offset.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for PackConfig {
    /// Default values:
    /// - `input_dir`: `dist`
    /// - `output_dir`: `dist-zip`
    /// - `output_file_name`: `dist.zip`
    /// - `path_prefix`: empty
    /// - `password`: `None`
    /// - `filter`: [`AcceptAll`]
    /// - `enable_logging`: `true`
    /// - `follow_symlinks`: `true`
    /// - `utc_offset`: `None`
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("dist"),
            output_dir: PathBuf::from("dist-zip"),
            output_file_name: "dist.zip".to_string(),
            path_prefix: String::new(),
            password: None,
            filter: Arc::new(AcceptAll),
            enable_logging: true,
            follow_symlinks: true,
            utc_offset: None,
        }
    }
}

impl fmt::Debug for PackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("output_file_name", &self.output_file_name)
            .field("path_prefix", &self.path_prefix)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("filter", &"dyn EntryFilter")
            .field("enable_logging", &self.enable_logging)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("utc_offset", &self.utc_offset)
            .finish()
    }
}

impl PackConfig {
    /// Creates a `PackConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input directory.
    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the archive file name.
    #[must_use]
    pub fn with_output_file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = name.into();
        self
    }

    /// Sets the in-archive path prefix.
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Sets the archive password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the entry filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl EntryFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Sets whether every step is printed.
    #[must_use]
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Sets whether symlinks are followed.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Sets a fixed UTC offset for entry timestamps.
    #[must_use]
    pub fn with_utc_offset(mut self, offset: Option<FixedOffset>) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Full path of the archive: `output_dir/output_file_name`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file_name)
    }

    /// Validates the configuration without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidPathPrefix`] if the prefix is absolute or
    /// contains `..`, and [`PackError::InvalidConfiguration`] if:
    /// - the output file name is empty or contains a path separator
    /// - the password is set but empty
    pub fn validate(&self) -> Result<()> {
        PathPrefix::parse(&self.path_prefix)?;

        if self.output_file_name.is_empty() {
            return Err(PackError::InvalidConfiguration {
                reason: "output file name must not be empty".to_string(),
            });
        }

        if self.output_file_name.contains(['/', '\\']) {
            return Err(PackError::InvalidConfiguration {
                reason: format!(
                    "output file name must not contain a path separator: '{}'",
                    self.output_file_name
                ),
            });
        }

        if self.password.as_deref() == Some("") {
            return Err(PackError::InvalidConfiguration {
                reason: "password must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
