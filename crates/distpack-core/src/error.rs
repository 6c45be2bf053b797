//! Error types for archive packing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while packing a directory into an archive.
#[derive(Error, Debug)]
pub enum PackError {
    /// I/O operation failed (read, stat, walk, mkdir, write or unlink).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input directory is missing at run start.
    #[error("\"{}\" folder does not exist!", path.display())]
    InputNotFound {
        /// The input directory that was looked up.
        path: PathBuf,
    },

    /// The configured path prefix is not a usable relative path.
    #[error("\"pathPrefix\" must be a relative path: '{prefix}' ({reason})")]
    InvalidPathPrefix {
        /// The prefix as configured.
        prefix: String,
        /// Why the prefix was rejected.
        reason: String,
    },

    /// Configuration is invalid for a reason other than the path prefix.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for the configuration error.
        reason: String,
    },

    /// A directory entry could not be registered in the archive writer.
    #[error("'{path}' couldn't be included as a directory in the zip: {reason}")]
    DirectoryEntry {
        /// In-archive path of the directory.
        path: String,
        /// Underlying writer failure.
        reason: String,
    },

    /// The archive writer failed while starting an entry or finishing.
    #[error("archive error: {0}")]
    Archive(String),
}

impl PackError {
    /// Returns `true` if this error was raised by configuration validation,
    /// before any filesystem access.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::PackError;
    ///
    /// let err = PackError::InvalidPathPrefix {
    ///     prefix: "/abs".to_string(),
    ///     reason: "absolute path".to_string(),
    /// };
    /// assert!(err.is_configuration_error());
    ///
    /// let err = PackError::Archive("broken".to_string());
    /// assert!(!err.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPathPrefix { .. } | Self::InvalidConfiguration { .. }
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::PackError;
    ///
    /// let err = PackError::Archive("bad central directory".to_string());
    /// assert_eq!(err.context(), Some("bad central directory"));
    ///
    /// let err = PackError::InputNotFound { path: "dist".into() };
    /// assert_eq!(err.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Archive(msg) => Some(msg),
            Self::InvalidConfiguration { reason }
            | Self::InvalidPathPrefix { reason, .. }
            | Self::DirectoryEntry { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_not_found_display() {
        let err = PackError::InputNotFound {
            path: PathBuf::from("dist"),
        };
        assert_eq!(err.to_string(), "\"dist\" folder does not exist!");
    }

    #[test]
    fn test_invalid_prefix_display() {
        let err = PackError::InvalidPathPrefix {
            prefix: "/abs/prefix".to_string(),
            reason: "absolute path".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("must be a relative path"));
        assert!(msg.contains("/abs/prefix"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PackError = io_err.into();
        assert!(matches!(err, PackError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_configuration_errors() {
        let err = PackError::InvalidConfiguration {
            reason: "output file name is empty".to_string(),
        };
        assert!(err.is_configuration_error());
        assert_eq!(err.context(), Some("output file name is empty"));
    }

    #[test]
    fn test_directory_entry_context() {
        let err = PackError::DirectoryEntry {
            path: "assets/".to_string(),
            reason: "duplicate name".to_string(),
        };
        assert!(!err.is_configuration_error());
        assert_eq!(err.context(), Some("duplicate name"));
        assert!(err.to_string().contains("assets/"));
    }
}
