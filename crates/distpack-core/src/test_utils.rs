//! Test utilities for building input trees and inspecting archives.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::PackError;
use crate::PackReport;
use crate::progress::PackProgress;
use std::fs;
use std::io::Cursor;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;
use zip::ZipArchive;

/// Creates files and directories under `root`.
///
/// Each entry is a tuple of (relative path, content). A path ending in `/`
/// creates a directory and ignores the content. Parent directories are
/// created as needed.
///
/// # Examples
///
/// ```
/// use distpack_core::test_utils::write_tree;
///
/// let temp = tempfile::TempDir::new().unwrap();
/// write_tree(temp.path(), &[("a.txt", "a"), ("empty/", ""), ("config/b.txt", "b")]);
/// assert!(temp.path().join("config/b.txt").is_file());
/// assert!(temp.path().join("empty").is_dir());
/// ```
pub fn write_tree(root: &Path, entries: &[(&str, &str)]) {
    for (path, content) in entries {
        if let Some(dir) = path.strip_suffix('/') {
            fs::create_dir_all(root.join(dir)).unwrap();
            continue;
        }
        let target = root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(target, content).unwrap();
    }
}

/// Lists entry names of a ZIP archive in central directory order.
///
/// # Examples
///
/// ```
/// use distpack_core::PackConfig;
/// use distpack_core::test_utils::archive_names;
/// use distpack_core::test_utils::write_tree;
///
/// let temp = tempfile::TempDir::new().unwrap();
/// write_tree(&temp.path().join("dist"), &[("index.html", "<html></html>")]);
///
/// let config = PackConfig::default()
///     .with_input_dir(temp.path().join("dist"))
///     .with_output_dir(temp.path().join("out"))
///     .with_logging(false);
/// let report = distpack_core::pack(config).unwrap();
///
/// let bytes = std::fs::read(report.output_path).unwrap();
/// assert_eq!(archive_names(&bytes), ["index.html"]);
/// ```
#[must_use]
pub fn archive_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Reads the content of an unencrypted entry.
#[must_use]
pub fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    file.read_to_end(&mut content).unwrap();
    content
}

/// Reads the content of an encrypted entry.
#[must_use]
pub fn read_encrypted_entry(bytes: &[u8], name: &str, password: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name_decrypt(name, password.as_bytes()).unwrap();
    let mut content = Vec::new();
    file.read_to_end(&mut content).unwrap();
    content
}

/// Progress sink that records the name of every hook called.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded hook names in call order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, event: impl Into<String>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.into());
    }
}

impl PackProgress for RecordingProgress {
    fn on_start(&self, _input_dir: &Path) {
        self.record("start");
    }

    fn on_preparing(&self) {
        self.record("preparing");
    }

    fn on_archiving(&self) {
        self.record("archiving");
    }

    fn on_done(&self, _report: &PackReport) {
        self.record("done");
    }

    fn on_failed(&self, _error: &PackError) {
        self.record("failed");
    }
}
