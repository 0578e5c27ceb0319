// Declare modules
pub mod cli;
pub mod config;
pub mod lines;
pub mod matchers;
pub mod models;
pub mod reporter;
pub mod scanner;
pub mod walker;
pub mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;

use self::cli::Cli;
use self::config::{load_presets_file, presets_path, resolve_config};
use self::reporter::ConsoleReporter;
use self::scanner::Scanner;
use self::writer::write_output;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Resolve Configuration (presets + CLI), failing before any traversal
    let presets = load_presets_file(&presets_path()?)?;
    let config = resolve_config(args, &presets).context("Invalid configuration")?;
    ConsoleReporter::print_config_summary(&config);

    // 3. Scan Directory
    let scanner = Scanner::new(&config)?;
    let mut reporter = ConsoleReporter;
    let (entries, stats) = scanner.scan(&mut reporter);

    if entries.is_empty() {
        ConsoleReporter::print_no_matches(&stats);
        return Ok(());
    }

    // 4. Write Output
    let write_start = Instant::now();
    let write_elapsed = write_output(&config, &entries, |processed, total| {
        ConsoleReporter::print_write_progress(processed, total, write_start)
    })?;
    println!();

    ConsoleReporter::print_done(&stats, write_elapsed, &config.output_file);
    Ok(())
}
