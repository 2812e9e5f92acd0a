use std::path::Path;

use rvcheck::golden::{ConvertConfig, convert_file};
use rvcheck::metrics;
use tracing::info;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal::{self, Spinner};

/// Convert a Spike commit log into a golden commit log.
pub fn cmd_convert(input: &Path, output: &Path, boot_threshold: u64) -> i32 {
    info!(input = %input.display(), output = %output.display(), "converting");
    let config = ConvertConfig { boot_threshold };
    let spinner = Spinner::new(format!("Converting {}", input.display()));

    match convert_file(input, output, &config) {
        Ok(stats) => {
            metrics::record_convert(&stats);
            spinner.finish_with_success(&format!(
                "Converted {} to {} (start from PC 0x{:x})",
                input.display(),
                output.display(),
                boot_threshold
            ));
            terminal::dim(&format!(
                "{} written, {} dropped, {} without effect omitted",
                terminal::count(stats.emitted, "record"),
                terminal::count(stats.boot_region, "boot-code commit"),
                terminal::count(stats.no_effect, "commit")
            ));
            info!(output = %output.display(), records = stats.emitted, "done");
            EXIT_SUCCESS
        }
        Err(e) => {
            spinner.finish_with_failure(&format!("Error: {e}"));
            EXIT_FAILURE
        }
    }
}
