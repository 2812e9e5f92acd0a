//! Golden commit-log generation from Spike output.
//!
//! Spike's `--log-commits` output carries a lot more than the comparator needs.
//! This crate reduces it to the canonical one-record-per-line golden format:
//!
//! ```text
//! 0x00002000 (0x00000093) x1  0x00000000
//! 0x00002004 (0x00112023) mem 0x00001000 0x00000001
//! 0x00002008 (0x0000a087) x33 0x0000000040000000
//! ```
//!
//! Boot code below [`DEFAULT_BOOT_THRESHOLD`] is dropped, FP registers are
//! folded into the unified `x0`-`x63` index space and records without a
//! register or memory effect are omitted.

mod spike;

pub use spike::*;

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use rvcheck_trace::{TraceError, for_each_line, open_log};

/// First PC recorded in the golden log; everything below is boot code.
pub const DEFAULT_BOOT_THRESHOLD: u64 = 0x2000;

/// Default output file name for the golden log.
pub const DEFAULT_GOLDEN_LOG: &str = "commit.log";

/// Converter errors.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("file not found: {}", .path.display())]
    MissingFile { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid boot threshold address: {0}")]
    InvalidThreshold(String),
    #[error("output would overwrite input: {}", .path.display())]
    SameFile { path: PathBuf },
}

impl From<TraceError> for ConvertError {
    fn from(err: TraceError) -> Self {
        match err {
            TraceError::MissingFile { path } => Self::MissingFile { path },
            TraceError::Io(e) => Self::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Configuration for golden log conversion.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Records with a PC below this address are dropped.
    pub boot_threshold: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            boot_threshold: DEFAULT_BOOT_THRESHOLD,
        }
    }
}

/// Counts of what happened to each input line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Input lines read.
    pub lines: usize,
    /// Golden records written.
    pub emitted: usize,
    /// Commits dropped for being below the boot threshold.
    pub boot_region: usize,
    /// Commits dropped for having no register or memory effect.
    pub no_effect: usize,
    /// Lines that were not commit lines at all.
    pub ignored: usize,
}

/// One record of the canonical golden log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldenRecord<'a> {
    commit: SpikeCommit<'a>,
}

impl<'a> GoldenRecord<'a> {
    /// Golden record for `commit`, or `None` if it has no recorded effect.
    #[must_use]
    pub const fn from_commit(commit: SpikeCommit<'a>) -> Option<Self> {
        match commit.effect {
            Effect::None => None,
            _ => Some(Self { commit }),
        }
    }
}

impl fmt::Display for GoldenRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let SpikeCommit { pc, insn, .. } = self.commit;
        match self.commit.effect {
            Effect::Store { addr, data } => write!(f, "{pc} ({insn}) mem {addr} {data}"),
            Effect::RegWrite { value, .. } => {
                let reg = self.commit.unified_reg().unwrap_or_default();
                write!(f, "{pc} ({insn}) x{reg:<2} {value}")
            }
            Effect::None => write!(f, "{pc} ({insn})"),
        }
    }
}

/// Convert a Spike commit log read from `reader` into golden records on
/// `writer`.
///
/// # Errors
///
/// Propagates read and write errors.
pub fn convert<R, W>(reader: R, writer: &mut W, config: &ConvertConfig) -> Result<ConvertStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = ConvertStats::default();
    for_each_line(reader, |line| {
        stats.lines += 1;
        let Some(commit) = SpikeCommit::parse(line.trim()) else {
            if line.trim_start().starts_with("core") {
                warn!(line = stats.lines, "malformed spike commit line skipped");
            }
            stats.ignored += 1;
            return Ok(());
        };
        if commit.pc_value < config.boot_threshold {
            stats.boot_region += 1;
            return Ok(());
        }
        match GoldenRecord::from_commit(commit) {
            Some(record) => {
                writeln!(writer, "{record}")?;
                stats.emitted += 1;
            }
            None => stats.no_effect += 1,
        }
        Ok(())
    })?;
    debug!(?stats, "converted spike log");
    Ok(stats)
}

/// Convert the Spike log at `input` (optionally `.zst`) into `output`.
///
/// # Errors
///
/// Returns [`ConvertError::MissingFile`] if `input` does not exist,
/// [`ConvertError::SameFile`] if `output` names the same file as `input`, or
/// [`ConvertError::Io`] on any read or write failure.
pub fn convert_file(input: &Path, output: &Path, config: &ConvertConfig) -> Result<ConvertStats> {
    let reader = open_log(input)?;
    // Creating the output truncates it, which would empty an aliased input.
    if let (Ok(src), Ok(dst)) = (input.canonicalize(), output.canonicalize()) {
        if src == dst {
            return Err(ConvertError::SameFile {
                path: output.to_path_buf(),
            });
        }
    }
    let mut writer = BufWriter::new(File::create(output)?);
    let stats = convert(reader, &mut writer, config)?;
    writer.flush()?;
    Ok(stats)
}

/// Parse a boot threshold given as `0x`-prefixed hex or decimal.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidThreshold`] if `s` is not a valid address.
pub fn parse_address(s: &str) -> Result<u64> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|_| ConvertError::InvalidThreshold(s.to_string()))
}
