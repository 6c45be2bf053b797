//! Statistics for a finished pack run.

use crate::walker::WalkStats;
use std::path::PathBuf;
use std::time::Duration;

/// Report of a successful pack run.
///
/// # Examples
///
/// ```
/// use distpack_core::PackReport;
///
/// let mut report = PackReport::default();
/// report.files_added = 10;
/// report.bytes_read = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackReport {
    /// Number of file entries written.
    pub files_added: usize,

    /// Number of directory entries written, prefix directories included.
    pub directories_added: usize,

    /// Number of entries rejected by the filter. Descendants of a rejected
    /// directory are never visited and so are not counted.
    pub entries_pruned: usize,

    /// Symlinks left out because symlink following was disabled.
    pub symlinks_skipped: usize,

    /// Uncompressed bytes read from the input tree.
    pub bytes_read: u64,

    /// Size of the archive written to disk.
    pub bytes_compressed: u64,

    /// Where the archive was written.
    pub output_path: PathBuf,

    /// Wall time from trigger to archive on disk.
    pub duration: Duration,

    /// Non-fatal observations made during the run.
    pub warnings: Vec<String>,
}

impl PackReport {
    /// Creates an empty report for an archive at `output_path`.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Folds walker counters into the report.
    pub fn record_walk(&mut self, stats: &WalkStats) {
        self.files_added += stats.files;
        self.directories_added += stats.directories;
        self.entries_pruned += stats.pruned;
        self.symlinks_skipped += stats.symlinks_skipped;
        self.bytes_read += stats.bytes_read;
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Total entries in the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_read == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.bytes_compressed as f64
    }

    /// Returns the space saved as a percentage of the uncompressed size.
    ///
    /// Returns 0.0 when nothing was read and never goes below 0.0 for
    /// archives larger than their input.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_read == 0 {
            return 0.0;
        }
        let saved = self.bytes_read.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_read as f64) * 100.0
    }
}
