use crate::app::models::{RuntimeConfig, ScanStats};
use crate::app::scanner::ScanObserver;
use colored::Colorize;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 40;

/// Renders scan and write progress on stdout.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn print_config_summary(config: &RuntimeConfig) {
        println!();
        println!("{} {}", "Input directory:".bold(), config.input_dir.display());
        println!("{} {}", "Output file:    ".bold(), config.output_file.display());
        println!("{} {}", "Recursive:      ".bold(), config.recursive);
        println!(
            "{} {}, {}",
            "Headers, Body:  ".bold(),
            !config.no_headers,
            !config.no_body
        );
        println!(
            "{} {:?}, exclude: {:?}, mode: {}",
            "Path pattern:   ".bold(),
            config.pattern,
            config.exclude_pattern,
            config.match_mode
        );
        println!(
            "{} {:?}, exclude: {:?}",
            "Content pattern:".bold(),
            config.content_pattern,
            config.content_exclude_pattern
        );
        println!("{} {} lines", "Batch size:     ".bold(), config.batch_size);
        println!();
    }

    pub fn print_write_progress(processed: usize, total: usize, start: Instant) {
        print!("{}\r", progress_bar(processed, total, start.elapsed()));
        let _ = io::stdout().flush();
    }

    pub fn print_no_matches(stats: &ScanStats) {
        println!();
        println!(
            "{} (scanned {} files in {:.1}s)",
            "No files matched the given criteria.".yellow(),
            stats.scanned,
            stats.scan_elapsed.as_secs_f64()
        );
    }

    pub fn print_done(stats: &ScanStats, write_elapsed: Duration, output_file: &Path) {
        let size = fs::metadata(output_file)
            .map(|m| human_size(m.len()))
            .unwrap_or_else(|_| "unknown".to_string());
        let total = stats.scan_elapsed + write_elapsed;

        println!();
        println!(
            "{} Scan: {:.1}s, write: {:.1}s, total: {:.1}s.",
            "Done.".green(),
            stats.scan_elapsed.as_secs_f64(),
            write_elapsed.as_secs_f64(),
            total.as_secs_f64()
        );
        println!(
            "Matched files: {}, output: {} ({})",
            stats.matched,
            output_file.display(),
            size
        );
    }
}

impl ScanObserver for ConsoleReporter {
    fn on_progress(&mut self, scanned: usize, elapsed: Duration) {
        print!(
            "{} scanned {} files (elapsed {:.1}s)\r",
            "Scanning...".yellow(),
            scanned,
            elapsed.as_secs_f64()
        );
        let _ = io::stdout().flush();
    }

    fn on_warning(&mut self, relative_path: &str, error: Option<&dyn Error>) {
        println!("{}", warning_line(relative_path, error));
    }

    fn on_finished(&mut self, stats: &ScanStats) {
        println!();
        println!(
            "{} scanned {} files, matched {}, in {:.1}s.",
            "Scan finished:".cyan(),
            stats.scanned,
            stats.matched,
            stats.scan_elapsed.as_secs_f64()
        );
        println!();
    }
}

fn warning_line(relative_path: &str, error: Option<&dyn Error>) -> String {
    match error {
        Some(err) => format!(
            "{} could not read file {}: {}",
            "Warning:".red(),
            relative_path,
            err
        ),
        None => format!("{} could not read file {}", "Warning:".red(), relative_path),
    }
}

fn progress_bar(processed: usize, total: usize, elapsed: Duration) -> String {
    if total == 0 {
        return String::new();
    }
    let ratio = processed as f64 / total as f64;
    let filled = ((BAR_WIDTH as f64) * ratio) as usize;
    format!(
        "[{}{}] {}/{} ({:5.1}%) | {:6.1}s",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH.saturating_sub(filled)),
        processed,
        total,
        ratio * 100.0,
        elapsed.as_secs_f64()
    )
}

fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    for unit in ["KB", "MB", "GB"] {
        size /= 1024.0;
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
    }
    format!("{:.1} TB", size / 1024.0)
}
