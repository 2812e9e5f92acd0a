use std::path::Path;
use std::time::Instant;

use rvcheck::metrics;
use rvcheck::trace::{
    CompareConfig, Divergence, Trace, TraceComparison, compare_with_config, read_trace,
};
use tracing::debug;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Compare an RTL commit log against a golden commit log.
pub fn cmd_compare(rtl_path: &Path, golden_path: &Path, config: &CompareConfig) -> i32 {
    terminal::info(&format!(
        "Comparing {} vs {} ...",
        terminal::highlight(rtl_path.display()),
        terminal::highlight(golden_path.display())
    ));

    let start = Instant::now();
    let Some(rtl) = load(rtl_path, "rtl") else {
        return EXIT_FAILURE;
    };
    let Some(gold) = load(golden_path, "golden") else {
        return EXIT_FAILURE;
    };

    let result = compare_with_config(&rtl, &gold, config);
    let elapsed = start.elapsed().as_secs_f64();
    debug!(elapsed_secs = elapsed, matched = result.matched, "comparison finished");
    metrics::record_comparison(&result, elapsed);

    report(&result, &rtl, &gold)
}

fn load(path: &Path, role: &'static str) -> Option<Trace> {
    match read_trace(path) {
        Ok(trace) => {
            metrics::record_trace(role, &trace);
            Some(trace)
        }
        Err(e) => {
            terminal::error(&format!("Error: {e}"));
            None
        }
    }
}

fn report(result: &TraceComparison, rtl: &Trace, gold: &Trace) -> i32 {
    if rtl.len() > gold.len() && result.matched == gold.len() {
        terminal::info(&format!(
            "RTL has {}. Analyzing...",
            terminal::count(rtl.len() - gold.len(), "extra line")
        ));
    }

    match &result.divergence {
        Some(divergence) => {
            report_divergence(divergence);
            EXIT_FAILURE
        }
        None => {
            if !result.trailing.is_empty() {
                for record in &result.trailing {
                    terminal::dim(&format!("Ignoring extra RTL commit: {record}"));
                }
                terminal::warning(&format!(
                    "Ignored {} (assumed simulation exit sequence).",
                    terminal::count(result.trailing.len(), "trailing instruction")
                ));
            }
            terminal::success(&format!(
                "Verification Successful! Logs match. ({})",
                terminal::count(result.matched, "instruction")
            ));
            EXIT_SUCCESS
        }
    }
}

fn report_divergence(divergence: &Divergence) {
    match divergence {
        Divergence::LengthDeficit { rtl_len, gold_len } => {
            terminal::error("RTL log stopped earlier than golden log.");
            terminal::indent(&format!("RTL lines: {rtl_len}, Golden lines: {gold_len}"));
        }
        Divergence::TokenMismatch {
            index,
            expected,
            actual,
            field,
            gold_line,
            rtl_line,
        } => {
            terminal::error(&format!("Mismatch at line {}", index + 1));
            terminal::indent(&format!("Golden: {expected}"));
            terminal::indent(&format!("RTL   : {actual}"));
            if let Some(field) = field {
                terminal::indent(&format!("Differs at {field}"));
            }
            if let (Some(gold_line), Some(rtl_line)) = (gold_line, rtl_line) {
                terminal::dim(&format!(
                    "golden log line {gold_line}, RTL log line {rtl_line}"
                ));
            }
        }
        Divergence::ExcessTrailing { count, first } => {
            terminal::error(&format!(
                "RTL has too many extra lines ({count}). Something is wrong."
            ));
            terminal::indent(&format!("First extra line: {first}"));
        }
    }
    terminal::dim(&format!("reason: {}", divergence.kind()));
}
