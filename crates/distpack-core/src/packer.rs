//! Pack lifecycle: validate, guard, walk, finalize, write, report.
//!
//! A [`DistPacker`] is created once per build and triggered from the build
//! tool's "build finished" hook through [`DistPacker::on_build_end`]. The first
//! trigger runs the whole pipeline; any trigger arriving while it runs, or
//! after it finished, is ignored.

use crate::PackConfig;
use crate::PackError;
use crate::PackReport;
use crate::Result;
use crate::entry::ArchiveEntry;
use crate::guard::RunGuard;
use crate::path::PathPrefix;
use crate::progress::ConsoleProgress;
use crate::progress::PackProgress;
use crate::timestamp;
use crate::walker::FilteredWalker;
use crate::writer::EntrySink;
use crate::writer::ZipSink;
use std::fmt;
use std::fs;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Completion callback, called exactly once per packer.
type DoneCallback = Box<dyn FnOnce(std::result::Result<&PackReport, &PackError>) + Send>;

/// Observable lifecycle state of a [`DistPacker`].
///
/// States only move forward. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PackState {
    /// Created, not triggered yet.
    Idle,

    /// Checking configuration and input directory.
    Validating,

    /// Walking the input tree into the archive.
    Compressing,

    /// Finishing the archive and writing it to disk.
    Finalizing,

    /// Archive written and callback delivered.
    Done,

    /// Run failed and callback delivered.
    Failed,
}

impl PackState {
    /// Returns `true` for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Compressing => "compressing",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of one [`DistPacker::on_build_end`] call.
#[derive(Debug)]
#[must_use]
pub enum PackOutcome {
    /// This call ran the pipeline and wrote the archive.
    Packed(PackReport),

    /// This call ran the pipeline and it failed.
    Failed(PackError),

    /// Another call already ran, or is running, the pipeline.
    Ignored,
}

impl PackOutcome {
    /// Returns `true` if this call did nothing.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Returns the report of a successful run.
    #[must_use]
    pub const fn report(&self) -> Option<&PackReport> {
        match self {
            Self::Packed(report) => Some(report),
            _ => None,
        }
    }

    /// Returns the error of a failed run.
    #[must_use]
    pub const fn error(&self) -> Option<&PackError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Converts into a `Result`, or `None` if the call was ignored.
    #[must_use]
    pub fn into_result(self) -> Option<Result<PackReport>> {
        match self {
            Self::Packed(report) => Some(Ok(report)),
            Self::Failed(err) => Some(Err(err)),
            Self::Ignored => None,
        }
    }
}

/// Packs a build output directory into a ZIP archive when the build ends.
///
/// The packer is `Send + Sync`; the build hook may fire from any thread and
/// more than once. Exactly one call runs the pipeline and exactly one call
/// delivers the completion callback.
///
/// # Examples
///
/// ```no_run
/// use distpack_core::DistPacker;
/// use distpack_core::PackConfig;
///
/// let packer = DistPacker::new(PackConfig::default().with_path_prefix("site"))
///     .with_done(|result| match result {
///         Ok(report) => println!("packed {} files", report.files_added),
///         Err(err) => eprintln!("packing failed: {err}"),
///     });
///
/// // From the build tool's "build finished" hook:
/// let outcome = packer.on_build_end();
/// assert!(!outcome.is_ignored());
/// assert!(packer.on_build_end().is_ignored());
/// ```
pub struct DistPacker {
    config: PackConfig,
    guard: RunGuard,
    state: Mutex<PackState>,
    on_done: Mutex<Option<DoneCallback>>,
    progress: Box<dyn PackProgress>,
}

impl fmt::Debug for DistPacker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistPacker")
            .field("config", &self.config)
            .field("guard", &self.guard)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl DistPacker {
    /// Creates a packer. Progress goes to the console, verbose when
    /// `config.enable_logging` is set.
    #[must_use]
    pub fn new(config: PackConfig) -> Self {
        let progress = ConsoleProgress::new(config.enable_logging);
        Self {
            config,
            guard: RunGuard::new(),
            state: Mutex::new(PackState::Idle),
            on_done: Mutex::new(None),
            progress: Box::new(progress),
        }
    }

    /// Sets the completion callback.
    ///
    /// It receives `Ok(&report)` or `Err(&error)` exactly once, from the call
    /// that ran the pipeline.
    #[must_use]
    pub fn with_done<F>(self, callback: F) -> Self
    where
        F: FnOnce(std::result::Result<&PackReport, &PackError>) + Send + 'static,
    {
        *self.lock_callback() = Some(Box::new(callback));
        self
    }

    /// Replaces the progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: impl PackProgress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PackState {
        *self.lock_state()
    }

    /// Runs the pipeline in response to the build tool's "build finished"
    /// signal.
    ///
    /// Returns [`PackOutcome::Ignored`] without side effects once another
    /// call has started traversal or the packer has reached a terminal state.
    pub fn on_build_end(&self) -> PackOutcome {
        if self.state().is_terminal() || self.guard.is_compressing() {
            debug!(state = %self.state(), "duplicate build end signal ignored");
            return PackOutcome::Ignored;
        }

        let started = Instant::now();
        let prefix = self.validate();

        // The guard decides which caller owns the run, including runs that
        // fail validation.
        if !self.guard.try_begin() {
            debug!("pack already running; build end signal ignored");
            return PackOutcome::Ignored;
        }
        self.progress.on_start(&self.config.input_dir);

        let result = prefix.and_then(|prefix| {
            self.progress.on_preparing();
            self.compress(prefix.as_ref(), started)
        });
        self.complete(result)
    }

    /// Checks configuration and input, then creates the output directory.
    fn validate(&self) -> Result<Option<PathPrefix>> {
        self.advance(PackState::Validating);

        let prefix = PathPrefix::parse(&self.config.path_prefix)?;
        self.config.validate()?;

        if !self.config.input_dir.is_dir() {
            return Err(PackError::InputNotFound {
                path: self.config.input_dir.clone(),
            });
        }

        fs::create_dir_all(&self.config.output_dir)?;
        Ok(prefix)
    }

    fn compress(&self, prefix: Option<&PathPrefix>, started: Instant) -> Result<PackReport> {
        self.advance(PackState::Compressing);

        let output_path = self.config.output_path();
        let mut report = PackReport::new(&output_path);
        let mut sink = ZipSink::new(self.config.password.clone());

        if let Some(prefix) = prefix {
            // Prefix directories take the input root's mtime so that output
            // does not depend on the time of the run.
            let modified = fs::metadata(&self.config.input_dir)?.modified()?;
            let modified = timestamp::normalize(modified, self.config.utc_offset);
            for dir in prefix.as_archive_path().ancestors() {
                sink.add_entry(ArchiveEntry::directory(dir, modified))?;
                report.directories_added += 1;
            }
        }

        let walker = FilteredWalker::new(&self.config.input_dir, self.config.filter.as_ref())
            .with_follow_symlinks(self.config.follow_symlinks);
        let stats = walker.pack_into(&mut sink, prefix, self.config.utc_offset)?;
        report.record_walk(&stats);

        if stats.symlinks_skipped > 0 {
            warn!(count = stats.symlinks_skipped, "symlinks left out of archive");
            report.add_warning(format!("{} symlinks skipped", stats.symlinks_skipped));
        }

        self.advance(PackState::Finalizing);
        self.progress.on_archiving();
        let payload = sink.finish()?;

        if output_path.try_exists()? {
            debug!(path = %output_path.display(), "replacing existing archive");
            fs::remove_file(&output_path)?;
        }
        fs::write(&output_path, &payload)?;

        report.bytes_compressed = payload.len() as u64;
        report.duration = started.elapsed();
        Ok(report)
    }

    /// Moves to a terminal state and delivers the callback.
    fn complete(&self, result: Result<PackReport>) -> PackOutcome {
        {
            let mut state = self.lock_state();
            if state.is_terminal() {
                return PackOutcome::Ignored;
            }
            *state = if result.is_ok() {
                PackState::Done
            } else {
                PackState::Failed
            };
        }

        let callback = self.lock_callback().take();
        match result {
            Ok(report) => {
                info!(
                    output = %report.output_path.display(),
                    files = report.files_added,
                    directories = report.directories_added,
                    pruned = report.entries_pruned,
                    bytes = report.bytes_compressed,
                    "archive written"
                );
                self.progress.on_done(&report);
                if let Some(callback) = callback {
                    callback(Ok(&report));
                }
                PackOutcome::Packed(report)
            }
            Err(err) => {
                info!(error = %err, "pack failed");
                self.progress.on_failed(&err);
                if let Some(callback) = callback {
                    callback(Err(&err));
                }
                PackOutcome::Failed(err)
            }
        }
    }

    /// Moves the state forward; never leaves a terminal state.
    fn advance(&self, next: PackState) {
        let mut state = self.lock_state();
        if !state.is_terminal() && next > *state {
            info!(from = %*state, to = %next, "pack state changed");
            *state = next;
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_callback(&self) -> MutexGuard<'_, Option<DoneCallback>> {
        self.on_done.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Packs `config.input_dir` once and returns the report.
///
/// # Errors
///
/// Returns the error that failed the run: a configuration error, a missing
/// input directory, or an I/O or archive failure.
///
/// # Examples
///
/// ```no_run
/// use distpack_core::PackConfig;
///
/// let report = distpack_core::pack(PackConfig::default())?;
/// println!("{} bytes", report.bytes_compressed);
/// # Ok::<(), distpack_core::PackError>(())
/// ```
pub fn pack(config: PackConfig) -> Result<PackReport> {
    match DistPacker::new(config).on_build_end() {
        PackOutcome::Packed(report) => Ok(report),
        PackOutcome::Failed(err) => Err(err),
        // A fresh packer never ignores its first signal.
        PackOutcome::Ignored => Err(PackError::Archive("pack run was ignored".to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::filter::PatternFilter;
    use crate::test_utils::RecordingProgress;
    use crate::test_utils::archive_names;
    use crate::test_utils::read_entry;
    use crate::test_utils::write_tree;
    use chrono::FixedOffset;
    use std::path::Path;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn config_for(temp: &TempDir) -> PackConfig {
        PackConfig::default()
            .with_input_dir(temp.path().join("dist"))
            .with_output_dir(temp.path().join("dist-zip"))
            .with_utc_offset(FixedOffset::east_opt(0))
    }

    fn quiet(config: PackConfig) -> DistPacker {
        DistPacker::new(config).with_progress(crate::progress::NoProgress)
    }

    fn counting(config: PackConfig, calls: &Arc<AtomicUsize>) -> DistPacker {
        let calls = Arc::clone(calls);
        quiet(config).with_done(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_packer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DistPacker>();
    }

    #[test]
    fn test_filter_excludes_config_dir() {
        let temp = TempDir::new().unwrap();
        write_tree(
            &temp.path().join("dist"),
            &[("a.txt", "a"), ("config/b.txt", "b")],
        );
        let config = config_for(&temp).with_filter(|_: &str, path: &Path, _: bool| {
            !path.to_string_lossy().contains("config")
        });

        let report = pack(config).unwrap();

        let bytes = fs::read(&report.output_path).unwrap();
        assert_eq!(archive_names(&bytes), ["a.txt"]);
        assert_eq!(read_entry(&bytes, "a.txt"), b"a");
        assert_eq!(report.files_added, 1);
        assert_eq!(report.directories_added, 0);
        assert_eq!(report.entries_pruned, 1);
    }

    #[test]
    fn test_missing_input_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let seen = Arc::new(Mutex::new(None));
        let seen_in_callback = Arc::clone(&seen);
        let packer = quiet(config_for(&temp)).with_done(move |result| {
            *seen_in_callback.lock().unwrap() = Some(result.map(|_| ()).map_err(ToString::to_string));
        });

        let outcome = packer.on_build_end();

        assert!(matches!(
            outcome.error(),
            Some(PackError::InputNotFound { path }) if path == &temp.path().join("dist")
        ));
        let seen = seen.lock().unwrap().clone().unwrap();
        assert!(seen.unwrap_err().contains("folder does not exist"));
        assert!(!temp.path().join("dist-zip").exists());
        assert_eq!(packer.state(), PackState::Failed);
    }

    #[test]
    fn test_absolute_prefix_fails_before_traversal() {
        let temp = TempDir::new().unwrap();
        write_tree(&temp.path().join("dist"), &[("a.txt", "a")]);
        let calls = Arc::new(AtomicUsize::new(0));
        let packer = counting(config_for(&temp).with_path_prefix("/abs/prefix"), &calls);

        let outcome = packer.on_build_end();

        let err = outcome.error().unwrap();
        assert!(matches!(err, PackError::InvalidPathPrefix { prefix, .. } if prefix == "/abs/prefix"));
        assert!(err.is_configuration_error());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!temp.path().join("dist-zip").exists());
    }

    #[test]
    fn test_prefix_nests_every_entry() {
        let temp = TempDir::new().unwrap();
        write_tree(
            &temp.path().join("dist"),
            &[("index.html", "<html></html>"), ("assets/app.js", "1")],
        );

        let report = pack(config_for(&temp).with_path_prefix("site/v1")).unwrap();

        let names = archive_names(&fs::read(&report.output_path).unwrap());
        assert_eq!(&names[..2], ["site/", "site/v1/"]);
        assert!(names.iter().all(|name| name.starts_with("site/")));
        assert!(names.contains(&"site/v1/index.html".to_string()));
        assert!(names.contains(&"site/v1/assets/".to_string()));
        assert!(names.contains(&"site/v1/assets/app.js".to_string()));
        assert_eq!(report.directories_added, 3);
    }

    #[test]
    fn test_second_signal_is_ignored() {
        let temp = TempDir::new().unwrap();
        write_tree(&temp.path().join("dist"), &[("a.txt", "a")]);
        let calls = Arc::new(AtomicUsize::new(0));
        let packer = counting(config_for(&temp), &calls);

        assert!(matches!(packer.on_build_end(), PackOutcome::Packed(_)));
        assert!(packer.on_build_end().is_ignored());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(packer.state(), PackState::Done);
    }

    #[test]
    fn test_failed_packer_ignores_later_signals() {
        let temp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let packer = counting(config_for(&temp), &calls);

        assert!(packer.on_build_end().error().is_some());

        // Input appears later; the packer stays failed.
        write_tree(&temp.path().join("dist"), &[("a.txt", "a")]);
        assert!(packer.on_build_end().is_ignored());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!temp.path().join("dist-zip/dist.zip").exists());
    }

    #[test]
    fn test_concurrent_signals_pack_once() {
        let temp = TempDir::new().unwrap();
        write_tree(
            &temp.path().join("dist"),
            &[("a.txt", "a"), ("nested/b.txt", "b")],
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let packer = counting(config_for(&temp), &calls);

        let outcomes: Vec<PackOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| packer.on_build_end())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let packed = outcomes.iter().filter(|o| o.report().is_some()).count();
        let ignored = outcomes.iter().filter(|o| o.is_ignored()).count();
        assert_eq!(packed, 1);
        assert_eq!(ignored, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let entries: Vec<PathBuf> = fs::read_dir(temp.path().join("dist-zip"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries, [temp.path().join("dist-zip/dist.zip")]);
    }

    #[test]
    fn test_rerun_replaces_existing_archive() {
        let temp = TempDir::new().unwrap();
        write_tree(&temp.path().join("dist"), &[("a.txt", "new")]);
        write_tree(&temp.path().join("dist-zip"), &[("dist.zip", "stale bytes")]);

        let report = pack(config_for(&temp)).unwrap();

        let bytes = fs::read(&report.output_path).unwrap();
        assert_eq!(bytes.len() as u64, report.bytes_compressed);
        assert_eq!(read_entry(&bytes, "a.txt"), b"new");
        assert_eq!(fs::read_dir(temp.path().join("dist-zip")).unwrap().count(), 1);
    }

    #[test]
    fn test_progress_sequence() {
        let temp = TempDir::new().unwrap();
        write_tree(&temp.path().join("dist"), &[("a.txt", "a")]);
        let progress = Arc::new(RecordingProgress::new());
        let packer = DistPacker::new(config_for(&temp)).with_progress(Arc::clone(&progress));

        assert!(packer.on_build_end().report().is_some());
        assert_eq!(progress.events(), ["start", "preparing", "archiving", "done"]);
    }

    #[test]
    fn test_progress_on_failure() {
        let temp = TempDir::new().unwrap();
        let progress = Arc::new(RecordingProgress::new());
        let packer = DistPacker::new(config_for(&temp)).with_progress(Arc::clone(&progress));

        assert!(packer.on_build_end().error().is_some());
        assert_eq!(progress.events(), ["start", "failed"]);
    }

    #[test]
    fn test_pattern_filter_and_empty_dirs() {
        let temp = TempDir::new().unwrap();
        write_tree(
            &temp.path().join("dist"),
            &[
                ("index.html", "<html></html>"),
                ("app.js.map", "{}"),
                ("empty/", ""),
            ],
        );

        let report = pack(config_for(&temp).with_filter(PatternFilter::new(["*.map"]))).unwrap();

        let mut names = archive_names(&fs::read(&report.output_path).unwrap());
        names.sort();
        assert_eq!(names, ["empty/", "index.html"]);
    }

    #[test]
    fn test_invalid_output_name() {
        let temp = TempDir::new().unwrap();
        write_tree(&temp.path().join("dist"), &[("a.txt", "a")]);

        let err = pack(config_for(&temp).with_output_file_name("../escape.zip")).unwrap_err();
        assert!(matches!(err, PackError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PackState::Compressing.to_string(), "compressing");
        assert!(PackState::Failed.is_terminal());
        assert!(!PackState::Finalizing.is_terminal());
        assert!(PackState::Validating < PackState::Compressing);
    }
}
