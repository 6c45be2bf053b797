//! Entry types flowing from the walker into the archive writer.

use crate::path::ArchivePath;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::time::SystemTime;

/// Kind of a filesystem entry found during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (anything that is not a directory once symlinks are
    /// resolved).
    File,

    /// Directory.
    Directory,
}

impl EntryKind {
    /// Returns `true` for directories.
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// A file or directory accepted by the filter during traversal.
///
/// Produced transiently by [`FilteredWalker`](crate::walker::FilteredWalker);
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// File or directory.
    pub kind: EntryKind,

    /// Base name of the entry.
    pub name: String,

    /// Path on disk, as reached from the traversal root.
    pub path: PathBuf,

    /// Path relative to the traversal root.
    pub relative: ArchivePath,

    /// Modification time reported by the filesystem.
    pub modified: SystemTime,
}

/// Payload of an archive entry.
#[derive(Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// Full content of a file.
    File(Vec<u8>),

    /// Directory marker; carries no bytes.
    Directory,
}

impl EntryContent {
    /// Number of content bytes (0 for directories).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::File(data) => data.len(),
            Self::Directory => 0,
        }
    }

    /// Returns `true` if there are no content bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EntryContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(data) => write!(f, "File({} bytes)", data.len()),
            Self::Directory => f.write_str("Directory"),
        }
    }
}

/// One record destined for the archive.
///
/// Written once, in traversal order, and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Composed in-archive path (prefix included).
    pub path: ArchivePath,

    /// File bytes or directory marker.
    pub content: EntryContent,

    /// Normalized modification timestamp.
    pub modified: NaiveDateTime,
}

impl ArchiveEntry {
    /// Creates a directory marker entry.
    #[must_use]
    pub fn directory(path: ArchivePath, modified: NaiveDateTime) -> Self {
        Self {
            path,
            content: EntryContent::Directory,
            modified,
        }
    }

    /// Creates a file entry owning its content.
    #[must_use]
    pub fn file(path: ArchivePath, data: Vec<u8>, modified: NaiveDateTime) -> Self {
        Self {
            path,
            content: EntryContent::File(data),
            modified,
        }
    }

    /// Returns `true` for directory markers.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self.content, EntryContent::Directory)
    }

    /// Name of the entry as written into the ZIP central directory.
    #[must_use]
    pub fn zip_name(&self) -> String {
        if self.is_dir() {
            self.path.dir_name()
        } else {
            self.path.file_name()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_entry_zip_name() {
        let entry = ArchiveEntry::directory(
            ArchivePath::from_segments(["assets"]),
            NaiveDateTime::default(),
        );
        assert!(entry.is_dir());
        assert_eq!(entry.zip_name(), "assets/");
        assert!(entry.content.is_empty());
    }

    #[test]
    fn test_file_entry_zip_name() {
        let entry = ArchiveEntry::file(
            ArchivePath::from_segments(["assets", "app.js"]),
            b"console.log(1)".to_vec(),
            NaiveDateTime::default(),
        );
        assert!(!entry.is_dir());
        assert_eq!(entry.zip_name(), "assets/app.js");
        assert_eq!(entry.content.len(), 14);
    }

    #[test]
    fn test_content_debug_hides_bytes() {
        let content = EntryContent::File(vec![0; 4]);
        assert_eq!(format!("{content:?}"), "File(4 bytes)");
        assert_eq!(format!("{:?}", EntryContent::Directory), "Directory");
    }

    #[test]
    fn test_entry_kind() {
        assert!(EntryKind::Directory.is_dir());
        assert!(!EntryKind::File.is_dir());
    }
}
