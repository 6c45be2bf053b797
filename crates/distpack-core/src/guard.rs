//! Re-entrancy guard for a single pack run.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// One-shot flag that flips from "not compressing" to "compressing" when
/// traversal begins.
///
/// Some build tools fire their "build finished" hook more than once for the
/// same build. Every invocation races on [`RunGuard::try_begin`]; only the
/// first one proceeds into traversal.
///
/// # Examples
///
/// ```
/// use distpack_core::RunGuard;
///
/// let guard = RunGuard::new();
/// assert!(!guard.is_compressing());
/// assert!(guard.try_begin());
/// assert!(!guard.try_begin());
/// assert!(guard.is_compressing());
/// ```
#[derive(Debug, Default)]
pub struct RunGuard {
    compressing: AtomicBool,
}

impl RunGuard {
    /// Creates a guard in the "not compressing" state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            compressing: AtomicBool::new(false),
        }
    }

    /// Flips the guard to "compressing".
    ///
    /// Returns `true` for exactly one caller over the guard's lifetime.
    pub fn try_begin(&self) -> bool {
        self.compressing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns `true` once traversal has begun.
    #[must_use]
    pub fn is_compressing(&self) -> bool {
        self.compressing.load(Ordering::Acquire)
    }
}
