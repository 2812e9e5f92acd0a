//! Command implementations.
//!
//! Each submodule handles one CLI command.

mod compare;
mod convert;
mod patch;

use rvcheck::PatchConfig;
use rvcheck::trace::CompareConfig;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Compare { .. } => handle_compare(cli),
        Commands::Convert { .. } => handle_convert(cli),
        Commands::Patch { .. } => handle_patch(cli),
    }
}

fn handle_compare(cli: &Cli) -> i32 {
    let Commands::Compare {
        rtl,
        golden,
        max_trailing,
        strict_fields,
    } = &cli.command
    else {
        unreachable!("compare command variant mismatch");
    };

    let config = CompareConfig {
        max_trailing: *max_trailing,
        drop_rtl_extra_field: !*strict_fields,
    };
    compare::cmd_compare(rtl, golden, &config)
}

fn handle_convert(cli: &Cli) -> i32 {
    let Commands::Convert {
        input,
        output,
        boot_threshold,
    } = &cli.command
    else {
        unreachable!("convert command variant mismatch");
    };

    convert::cmd_convert(input, output, *boot_threshold)
}

fn handle_patch(cli: &Cli) -> i32 {
    let Commands::Patch {
        file,
        stack_from,
        stack_to,
        exit_insn,
        exit_label,
    } = &cli.command
    else {
        unreachable!("patch command variant mismatch");
    };

    let config = PatchConfig {
        stack_from: *stack_from,
        stack_to: *stack_to,
        exit_insn: exit_insn.clone(),
        exit_label: exit_label.clone(),
    };
    patch::cmd_patch(file, &config)
}
