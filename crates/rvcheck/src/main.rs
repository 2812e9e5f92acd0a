//! rvcheck CLI - RTL commit-trace verification

mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        terminal::set_colors(false);
    }

    // Initialize metrics recorder if enabled
    let metrics_handle = if cli.metrics {
        rvcheck::metrics::CliRecorder::new().install()
    } else {
        None
    };
    rvcheck::metrics::init();

    // RUST_LOG wins over the built-in default; -v/-s still apply on top.
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rvcheck=info"));
    if cli.verbose {
        filter = filter.add_directive("rvcheck=debug".parse().expect("valid log directive"));
    } else if cli.silent {
        filter = filter.add_directive("rvcheck=error".parse().expect("valid log directive"));
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = commands::run_command(&cli);

    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}
