//! Assembly test-program patching for RTL simulation.
//!
//! Generated test programs reserve a large stack and finish with `ecall`,
//! which the RTL testbench has no handler for. Patching shrinks the stack
//! reservation and turns every exit into a jump to the test-exit label.

use std::path::{Path, PathBuf};

use regex::{Captures, NoExpand, Regex};
use thiserror::Error;
use tracing::debug;

/// Default file patched when none is given.
pub const DEFAULT_ASM_FILE: &str = "main.S";
/// `.rept` count reserved for the stack by the program generator.
pub const DEFAULT_STACK_FROM: u32 = 4999;
/// `.rept` count that fits the RTL memory map.
pub const DEFAULT_STACK_TO: u32 = 2000;
pub const DEFAULT_EXIT_INSN: &str = "ecall";
pub const DEFAULT_EXIT_LABEL: &str = "SystemExit";

/// Patcher errors.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("file not found: {}", .path.display())]
    MissingFile { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid substitution pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, PatchError>;

/// The two substitutions applied to a test program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchConfig {
    /// `.rept` argument to replace.
    pub stack_from: u32,
    /// Replacement `.rept` argument.
    pub stack_to: u32,
    /// Instruction replaced wherever it appears as a whole word.
    pub exit_insn: String,
    /// Label jumped to instead of `exit_insn`.
    pub exit_label: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            stack_from: DEFAULT_STACK_FROM,
            stack_to: DEFAULT_STACK_TO,
            exit_insn: DEFAULT_EXIT_INSN.to_string(),
            exit_label: DEFAULT_EXIT_LABEL.to_string(),
        }
    }
}

/// How many times each substitution was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub stack_replacements: usize,
    pub exit_replacements: usize,
}

impl PatchReport {
    /// Whether the source changed at all.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.stack_replacements > 0 || self.exit_replacements > 0
    }
}

/// Apply both substitutions to assembly `source`.
///
/// # Errors
///
/// Returns [`PatchError::Pattern`] if a substitution pattern cannot be built.
pub fn patch_source(source: &str, config: &PatchConfig) -> Result<(String, PatchReport)> {
    let stack = Regex::new(&format!(r"(\.rept\s+){}\b", config.stack_from))?;
    let exit = Regex::new(&format!(r"\b{}\b", regex::escape(&config.exit_insn)))?;
    let jump = format!("j {}", config.exit_label);

    let stack_replacements = stack.find_iter(source).count();
    let patched = stack.replace_all(source, |caps: &Captures<'_>| {
        format!("{}{}", &caps[1], config.stack_to)
    });

    let exit_replacements = exit.find_iter(&patched).count();
    let patched = exit.replace_all(&patched, NoExpand(&jump)).into_owned();

    Ok((
        patched,
        PatchReport {
            stack_replacements,
            exit_replacements,
        },
    ))
}

/// Patch the assembly file at `path` in place.
///
/// The file is only rewritten when at least one substitution applied.
///
/// # Errors
///
/// Returns [`PatchError::MissingFile`] if `path` does not exist, or
/// [`PatchError::Io`] if it cannot be read or written.
pub fn patch_file(path: &Path, config: &PatchConfig) -> Result<PatchReport> {
    if !path.is_file() {
        return Err(PatchError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let source = std::fs::read_to_string(path)?;
    let (patched, report) = patch_source(&source, config)?;
    if report.changed() {
        std::fs::write(path, patched)?;
    }
    debug!(path = %path.display(), ?report, "patched");
    Ok(report)
}
