//! rvcheck - RTL commit-trace verification
//!
//! Checks the instruction commit log of an RTL core against a golden log
//! produced by Spike, converts Spike logs into that golden format, and
//! prepares assembly test programs for RTL simulation.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use rvcheck::trace::{compare, read_trace};
//!
//! let rtl = read_trace(Path::new("rtl_commit.log"))?;
//! let gold = read_trace(Path::new("commit.log"))?;
//! let result = compare(&rtl, &gold);
//! println!("{} records matched", result.matched);
//! # Ok::<(), rvcheck::trace::TraceError>(())
//! ```

// Re-export from sub-crates
pub use rvcheck_golden as golden;
pub use rvcheck_trace as trace;

pub mod metrics;
pub mod patch;

pub use patch::{PatchConfig, PatchError, PatchReport, patch_file, patch_source};
