//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rvcheck::golden::{DEFAULT_BOOT_THRESHOLD, DEFAULT_GOLDEN_LOG, parse_address};
use rvcheck::patch::{
    DEFAULT_ASM_FILE, DEFAULT_EXIT_INSN, DEFAULT_EXIT_LABEL, DEFAULT_STACK_FROM,
    DEFAULT_STACK_TO,
};
use rvcheck::trace::MAX_BENIGN_TRAILING;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

/// Default RTL commit log name written by the testbench.
pub const DEFAULT_RTL_LOG: &str = "rtl_commit.log";

#[derive(Parser)]
#[command(name = "rvcheck")]
#[command(about = "RTL commit-trace verification against Spike golden logs")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable debug logging for rvcheck (same as RUST_LOG=rvcheck=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare an RTL commit log against a golden commit log
    Compare {
        /// RTL commit log
        #[arg(value_name = "RTL_LOG", default_value = DEFAULT_RTL_LOG)]
        rtl: PathBuf,

        /// Golden commit log
        #[arg(value_name = "GOLDEN_LOG", default_value = DEFAULT_GOLDEN_LOG)]
        golden: PathBuf,

        /// Trailing RTL records tolerated as a simulation exit sequence
        #[arg(long, default_value_t = MAX_BENIGN_TRAILING)]
        max_trailing: usize,

        /// Compare every RTL field, even an extra trailing cycle count
        #[arg(long)]
        strict_fields: bool,
    },
    /// Convert a Spike commit log into a golden commit log
    Convert {
        /// Spike log produced with --log-commits (may be .zst compressed)
        #[arg(value_name = "SPIKE_LOG")]
        input: PathBuf,

        /// Output golden commit log
        #[arg(short, long, default_value = DEFAULT_GOLDEN_LOG)]
        output: PathBuf,

        /// Drop records with a PC below this address (boot code)
        #[arg(long, value_name = "ADDR", default_value_t = DEFAULT_BOOT_THRESHOLD, value_parser = parse_threshold)]
        boot_threshold: u64,
    },
    /// Patch an assembly test program for RTL simulation
    Patch {
        /// Assembly source file, patched in place
        #[arg(value_name = "ASM", default_value = DEFAULT_ASM_FILE)]
        file: PathBuf,

        /// Stack `.rept` count to replace
        #[arg(long, default_value_t = DEFAULT_STACK_FROM)]
        stack_from: u32,

        /// Replacement stack `.rept` count
        #[arg(long, default_value_t = DEFAULT_STACK_TO)]
        stack_to: u32,

        /// Exit instruction to replace
        #[arg(long, default_value = DEFAULT_EXIT_INSN)]
        exit_insn: String,

        /// Label jumped to instead of the exit instruction
        #[arg(long, default_value = DEFAULT_EXIT_LABEL)]
        exit_label: String,
    },
}

fn parse_threshold(s: &str) -> Result<u64, String> {
    parse_address(s).map_err(|e| e.to_string())
}
