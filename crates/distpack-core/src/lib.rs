//! Packs a build output directory into a single ZIP archive.
//!
//! `distpack-core` is meant to run at the end of a frontend build: it walks
//! the output folder (`dist` by default), optionally filters and nests the
//! entries under a path prefix, and writes `dist-zip/dist.zip`. Archives are
//! reproducible for identical input trees when no password is set.
//!
//! # Examples
//!
//! ```no_run
//! use distpack_core::PackConfig;
//! use distpack_core::PatternFilter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackConfig::default()
//!     .with_path_prefix("my-app")
//!     .with_filter(PatternFilter::new(["*.map", ".DS_Store"]));
//! let report = distpack_core::pack(config)?;
//! println!("Packed {} files into {}", report.files_added, report.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! Build tools that may signal "build finished" more than once should hold a
//! [`DistPacker`] and call [`DistPacker::on_build_end`] from their hook.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod entry;
pub mod error;
pub mod filter;
pub mod guard;
pub mod packer;
pub mod path;
pub mod progress;
pub mod report;
pub mod test_utils;
pub mod timestamp;
pub mod walker;
pub mod writer;

// Re-export main API types
pub use config::PackConfig;
pub use error::PackError;
pub use error::Result;
pub use filter::AcceptAll;
pub use filter::EntryFilter;
pub use filter::PatternFilter;
pub use guard::RunGuard;
pub use packer::DistPacker;
pub use packer::PackOutcome;
pub use packer::PackState;
pub use packer::pack;
pub use progress::ConsoleProgress;
pub use progress::NoProgress;
pub use progress::PackProgress;
pub use report::PackReport;
