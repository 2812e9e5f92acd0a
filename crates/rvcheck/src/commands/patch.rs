use std::path::Path;

use rvcheck::metrics;
use rvcheck::{PatchConfig, patch_file};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Patch an assembly test program in place.
pub fn cmd_patch(path: &Path, config: &PatchConfig) -> i32 {
    terminal::info(&format!("Patching {} ...", terminal::highlight(path.display())));

    let report = match patch_file(path, config) {
        Ok(report) => report,
        Err(e) => {
            terminal::error(&format!("Error: {e}"));
            return EXIT_FAILURE;
        }
    };
    metrics::record_patch(&report);

    let stack = format!(".rept {}", config.stack_from);
    if report.stack_replacements > 0 {
        terminal::indent(&format!(
            "Replaced stack size: {stack} -> {} ({})",
            config.stack_to,
            terminal::count(report.stack_replacements, "occurrence")
        ));
    } else {
        terminal::warning(&format!("'{stack}' not found."));
    }

    if report.exit_replacements > 0 {
        terminal::indent(&format!(
            "Replaced instruction: {} -> j {} ({})",
            config.exit_insn,
            config.exit_label,
            terminal::count(report.exit_replacements, "occurrence")
        ));
    } else {
        terminal::warning(&format!("'{}' instruction not found.", config.exit_insn));
    }

    if report.changed() {
        terminal::success("Patch applied.");
    } else {
        terminal::info("No changes were needed.");
    }
    EXIT_SUCCESS
}
