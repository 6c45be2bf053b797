//! Human-readable progress for pack runs.
//!
//! A [`DistPacker`](crate::DistPacker) reports each lifecycle step through a
//! [`PackProgress`] implementation. [`ConsoleProgress`] prints styled lines to
//! stderr; [`NoProgress`] stays silent. Structured `tracing` events are
//! emitted independently of the progress sink.

use crate::PackError;
use crate::PackReport;
use console::Term;
use console::style;
use std::path::Path;
use std::sync::Arc;

/// Receives lifecycle notifications from a pack run.
///
/// Hooks take `&self` because a packer may be triggered from several threads
/// at once; implementations needing state should use interior mutability.
pub trait PackProgress: Send + Sync {
    /// A run was triggered for `input_dir`.
    fn on_start(&self, input_dir: &Path);

    /// Inputs were validated and the output directory exists.
    fn on_preparing(&self);

    /// Traversal finished; the archive is being finalized.
    fn on_archiving(&self);

    /// The archive was written.
    fn on_done(&self, report: &PackReport);

    /// The run failed.
    fn on_failed(&self, error: &PackError);
}

impl<P: PackProgress + ?Sized> PackProgress for Arc<P> {
    fn on_start(&self, input_dir: &Path) {
        (**self).on_start(input_dir);
    }

    fn on_preparing(&self) {
        (**self).on_preparing();
    }

    fn on_archiving(&self) {
        (**self).on_archiving();
    }

    fn on_done(&self, report: &PackReport) {
        (**self).on_done(report);
    }

    fn on_failed(&self, error: &PackError) {
        (**self).on_failed(error);
    }
}

/// Progress sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl PackProgress for NoProgress {
    fn on_start(&self, _input_dir: &Path) {}

    fn on_preparing(&self) {}

    fn on_archiving(&self) {}

    fn on_done(&self, _report: &PackReport) {}

    fn on_failed(&self, _error: &PackError) {}
}

/// Writes progress lines to stderr.
///
/// With `verbose` set, every step gets its own line. Otherwise only the
/// start line and a single completion line are printed. Failures are
/// always printed. Write errors are ignored.
#[derive(Debug, Clone)]
pub struct ConsoleProgress {
    term: Term,
    verbose: bool,
}

impl ConsoleProgress {
    /// Creates a console sink writing to stderr.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            term: Term::stderr(),
            verbose,
        }
    }

    /// Returns `true` if every step is printed.
    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn step(&self, text: &str) {
        let _ = self.term.write_line(&format!("{}", style(text).green()));
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PackProgress for ConsoleProgress {
    fn on_start(&self, input_dir: &Path) {
        let _ = self
            .term
            .write_line(&format!("{}", style(start_line(input_dir)).cyan()));
    }

    fn on_preparing(&self) {
        if self.verbose {
            self.step("  - Preparing files.");
        }
    }

    fn on_archiving(&self) {
        if self.verbose {
            self.step("  - Creating zip archive.");
        }
    }

    fn on_done(&self, _report: &PackReport) {
        if self.verbose {
            self.step("  - Done.");
        } else {
            self.step("  - Created zip archive.");
        }
    }

    fn on_failed(&self, error: &PackError) {
        for line in failure_lines(error) {
            let _ = self.term.write_line(&format!("{}", style(line).red()));
        }
    }
}

fn start_line(input_dir: &Path) -> String {
    format!("Zip packing - \"{}\" folder :", input_dir.display())
}

fn failure_lines(error: &PackError) -> [String; 2] {
    [
        format!("  - {error}"),
        "  - Something went wrong while building zip file!".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_start_line() {
        assert_eq!(
            start_line(Path::new("dist")),
            "Zip packing - \"dist\" folder :"
        );
    }

    #[test]
    fn test_failure_lines() {
        let err = PackError::InputNotFound {
            path: PathBuf::from("dist"),
        };
        let lines = failure_lines(&err);
        assert_eq!(lines[0], "  - \"dist\" folder does not exist!");
        assert_eq!(
            lines[1],
            "  - Something went wrong while building zip file!"
        );
    }

    #[test]
    fn test_console_verbosity() {
        assert!(ConsoleProgress::default().is_verbose());
        assert!(!ConsoleProgress::new(false).is_verbose());
    }

    #[test]
    fn test_progress_is_object_safe() {
        let sinks: Vec<Box<dyn PackProgress>> =
            vec![Box::new(NoProgress), Box::new(ConsoleProgress::new(false))];
        for sink in &sinks {
            sink.on_preparing();
            sink.on_archiving();
        }
    }
}
