//! Commit-trace comparison for RTL verification.
//!
//! Compares an RTL-generated instruction commit trace against a golden trace
//! produced by the reference simulator. Both logs share one line-oriented
//! record shape:
//!
//! ```text
//! PC          INST          TYPE ADDR       DATA
//! ---------------------------------------------------
//! 0x00002000 (0x00000093) x1  0x00000000
//! 0x00002004 (0x00112023) mem 0x00001000 0x00000001
//! ```
//!
//! Lines are normalized into [`CommitRecord`]s, collected into a [`Trace`],
//! and aligned positionally by [`compare`].
//!
//! # Example
//!
//! ```
//! use rvcheck_trace::{Trace, compare};
//!
//! let gold = Trace::from_text("0x2000 (0x00000013) x1 0x00000000\n");
//! let rtl = Trace::from_text("0x2000 (0x00000013) x1 0x0000_0000 42\n");
//! assert!(compare(&rtl, &gold).is_pass());
//! ```

mod compare;
mod normalize;
mod reader;
mod record;

pub use compare::*;
pub use normalize::*;
pub use reader::*;
pub use record::*;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a trace.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("file not found: {}", .path.display())]
    MissingFile { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TraceError>;
