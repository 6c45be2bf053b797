//! Archive writers.
//!
//! [`EntrySink`] is the append-only seam between the walker and the archive
//! format. [`ZipSink`] accumulates a ZIP archive in memory and hands back the
//! finished payload from [`ZipSink::finish`].

use crate::PackError;
use crate::Result;
use crate::entry::ArchiveEntry;
use crate::entry::EntryContent;
use crate::timestamp;
use chrono::NaiveDateTime;
use std::io::Cursor;
use std::io::Write;
use zip::AesMode;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// DEFLATE level used for every entry. Fixed so that output size is
/// reproducible.
pub const COMPRESSION_LEVEL: i64 = 9;

/// Entries at or above this size need ZIP64 headers.
const LARGE_FILE_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Append-only destination for archive entries.
pub trait EntrySink {
    /// Appends one entry. Entries are accepted in the order given.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be registered or its content
    /// cannot be written.
    fn add_entry(&mut self, entry: ArchiveEntry) -> Result<()>;
}

/// Records entries in memory; used to inspect what a walk produces.
impl EntrySink for Vec<ArchiveEntry> {
    fn add_entry(&mut self, entry: ArchiveEntry) -> Result<()> {
        self.push(entry);
        Ok(())
    }
}

/// Builds a ZIP archive in memory.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDateTime;
/// use distpack_core::entry::ArchiveEntry;
/// use distpack_core::path::ArchivePath;
/// use distpack_core::writer::EntrySink;
/// use distpack_core::writer::ZipSink;
///
/// let mut sink = ZipSink::new(None);
/// sink.add_entry(ArchiveEntry::file(
///     ArchivePath::from_segments(["hello.txt"]),
///     b"hello".to_vec(),
///     NaiveDateTime::default(),
/// ))?;
/// let payload = sink.finish()?;
/// assert!(payload.starts_with(b"PK"));
/// # Ok::<(), distpack_core::PackError>(())
/// ```
pub struct ZipSink {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    password: Option<String>,
    entries: usize,
}

impl ZipSink {
    /// Creates an empty archive. With a password, file entries are encrypted
    /// with AES-256.
    #[must_use]
    pub fn new(password: Option<String>) -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            password,
            entries: 0,
        }
    }

    /// Number of entries written so far.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Returns `true` if file entries will be encrypted.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.password.is_some()
    }

    /// Writes the central directory and returns the archive bytes.
    ///
    /// Consumes the sink, so an archive can only be finalized once.
    ///
    /// # Errors
    ///
    /// Returns an error if the central directory cannot be written.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| PackError::Archive(format!("failed to finish ZIP archive: {e}")))?;
        Ok(cursor.into_inner())
    }
}

impl EntrySink for ZipSink {
    fn add_entry(&mut self, entry: ArchiveEntry) -> Result<()> {
        let name = entry.zip_name();
        let options = entry_options(entry.modified);

        match entry.content {
            EntryContent::Directory => {
                self.zip
                    .add_directory(name.clone(), options)
                    .map_err(|e| PackError::DirectoryEntry {
                        path: name,
                        reason: e.to_string(),
                    })?;
            }
            EntryContent::File(data) => {
                let options = options.large_file(data.len() as u64 >= LARGE_FILE_THRESHOLD);
                let started = match self.password.as_deref() {
                    Some(password) => self.zip.start_file(
                        name.clone(),
                        options.with_aes_encryption(AesMode::Aes256, password),
                    ),
                    None => self.zip.start_file(name.clone(), options),
                };
                started.map_err(|e| {
                    PackError::Archive(format!("failed to start file {name} in ZIP: {e}"))
                })?;
                self.zip.write_all(&data)?;
            }
        }

        self.entries += 1;
        Ok(())
    }
}

fn entry_options(modified: NaiveDateTime) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .last_modified_time(timestamp::to_zip_datetime(modified))
}
