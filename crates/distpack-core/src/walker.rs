//! Directory tree walking with filtering.
//!
//! The walker visits the input tree depth-first in filesystem order (no
//! sorting), asks the configured [`EntryFilter`] about every entry, prunes
//! rejected directories without descending into them, and hands accepted
//! entries to an [`EntrySink`] as soon as they are read.

use crate::PackError;
use crate::Result;
use crate::entry::ArchiveEntry;
use crate::entry::DirectoryEntry;
use crate::entry::EntryKind;
use crate::filter::EntryFilter;
use crate::path::ArchivePath;
use crate::path::PathPrefix;
use crate::path::compose;
use crate::timestamp;
use crate::writer::EntrySink;
use chrono::FixedOffset;
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use tracing::trace;
use walkdir::WalkDir;

/// Walks a directory tree, consulting an [`EntryFilter`] for every entry.
///
/// # Examples
///
/// ```no_run
/// use distpack_core::filter::AcceptAll;
/// use distpack_core::walker::FilteredWalker;
/// use std::path::Path;
///
/// let walker = FilteredWalker::new(Path::new("dist"), &AcceptAll);
/// for entry in walker.walk() {
///     let entry = entry?;
///     println!("{:?} {}", entry.kind, entry.relative);
/// }
/// # Ok::<(), distpack_core::PackError>(())
/// ```
pub struct FilteredWalker<'a> {
    root: &'a Path,
    filter: &'a dyn EntryFilter,
    follow_symlinks: bool,
    pruned: Cell<usize>,
    symlinks_skipped: Cell<usize>,
}

impl<'a> FilteredWalker<'a> {
    /// Creates a walker over `root`. Symlinks are followed by default.
    #[must_use]
    pub fn new(root: &'a Path, filter: &'a dyn EntryFilter) -> Self {
        Self {
            root,
            filter,
            follow_symlinks: true,
            pruned: Cell::new(0),
            symlinks_skipped: Cell::new(0),
        }
    }

    /// Sets whether symlinks are followed.
    ///
    /// When disabled, symlinks are left out of the archive.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Number of entries rejected by the filter so far. Descendants of a
    /// rejected directory are not visited and therefore not counted.
    #[must_use]
    pub fn pruned(&self) -> usize {
        self.pruned.get()
    }

    /// Returns an iterator over accepted entries, parents before children.
    ///
    /// The root itself is not yielded.
    ///
    /// # Errors
    ///
    /// Entries may error if a directory cannot be listed, metadata cannot be
    /// read, or a symlink loop is detected.
    pub fn walk(&self) -> impl Iterator<Item = Result<DirectoryEntry>> + '_ {
        WalkDir::new(self.root)
            .min_depth(1)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(move |entry| self.admit(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) => self.build_entry(&entry).transpose(),
                Err(e) => Some(Err(walk_error(e))),
            })
    }

    /// Walks the tree and writes every accepted entry into `sink`.
    ///
    /// Directory entries are emitted before their children. File content is
    /// read in full. Paths are composed under `prefix` and timestamps
    /// normalized with `offset` (`None` means host local time).
    ///
    /// # Errors
    ///
    /// The first traversal, read or sink error aborts the walk.
    pub fn pack_into<S: EntrySink + ?Sized>(
        &self,
        sink: &mut S,
        prefix: Option<&PathPrefix>,
        offset: Option<FixedOffset>,
    ) -> Result<WalkStats> {
        let mut stats = WalkStats::default();

        for entry in self.walk() {
            let entry = entry?;
            let path = compose(prefix, &entry.relative);
            let modified = timestamp::normalize(entry.modified, offset);

            let archive_entry = match entry.kind {
                EntryKind::Directory => {
                    stats.directories += 1;
                    ArchiveEntry::directory(path, modified)
                }
                EntryKind::File => {
                    let data = fs::read(&entry.path).map_err(|e| {
                        io::Error::new(
                            e.kind(),
                            format!("cannot read {}: {e}", entry.path.display()),
                        )
                    })?;
                    stats.files += 1;
                    stats.bytes_read += data.len() as u64;
                    ArchiveEntry::file(path, data, modified)
                }
            };

            debug!(
                entry = %archive_entry.zip_name(),
                bytes = archive_entry.content.len(),
                "adding entry"
            );
            sink.add_entry(archive_entry)?;
        }

        stats.pruned = self.pruned();
        stats.symlinks_skipped = self.symlinks_skipped.get();
        Ok(stats)
    }

    fn admit(&self, entry: &walkdir::DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        let included = self
            .filter
            .include(&name, entry.path(), entry.file_type().is_dir());
        if !included {
            trace!(path = %entry.path().display(), "excluded by filter");
            self.pruned.set(self.pruned.get() + 1);
        }
        included
    }

    /// Builds a `DirectoryEntry` from a `walkdir::DirEntry`.
    ///
    /// Returns `Ok(None)` for symlinks that are not followed.
    fn build_entry(&self, entry: &walkdir::DirEntry) -> Result<Option<DirectoryEntry>> {
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            trace!(path = %entry.path().display(), "skipping symlink");
            self.symlinks_skipped.set(self.symlinks_skipped.get() + 1);
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(walk_error)?;
        let modified = metadata.modified().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("cannot read mtime of {}: {e}", entry.path().display()),
            )
        })?;

        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Ok(Some(DirectoryEntry {
            kind,
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path().to_path_buf(),
            relative: ArchivePath::from_walk(entry.path(), entry.depth()),
            modified,
        }))
    }
}

/// Counters collected by [`FilteredWalker::pack_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// File entries written.
    pub files: usize,

    /// Directory entries written (prefix directories excluded).
    pub directories: usize,

    /// Entries rejected by the filter.
    pub pruned: usize,

    /// Symlinks left out because symlink following was disabled.
    pub symlinks_skipped: usize,

    /// Uncompressed bytes read from files.
    pub bytes_read: u64,
}

/// Converts a walkdir error, keeping the underlying I/O error kind.
fn walk_error(err: walkdir::Error) -> PackError {
    let kind = err.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
    PackError::Io(io::Error::new(kind, format!("walkdir error: {err}")))
}
