use crate::app::models::MatchMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fileconcat",
    author,
    version,
    disable_version_flag = true,
    about = "Gather files from a directory into one file"
)]
pub struct Cli {
    /// Show the version and exit
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// Input directory from which to read files (optionally recursively)
    #[arg(short = 'i', long = "in", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Path to the resulting file
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub output_file: PathBuf,

    /// Write only file headers, without file contents
    #[arg(short = 'B', long)]
    pub no_body: bool,

    /// Write only file contents, without file headers
    #[arg(short = 'H', long)]
    pub no_headers: bool,

    /// Include only files whose relative path or name matches this pattern
    /// (e.g. regex '.*asdf.*/.*\.txt', exact 'dir/file.txt')
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// How to interpret patterns [default: exact]
    #[arg(short = 'm', long, value_enum)]
    pub match_mode: Option<MatchMode>,

    /// Exclude files whose relative path or name matches this pattern
    #[arg(short = 'x', long)]
    pub exclude_pattern: Option<String>,

    /// Recurse into subdirectories; otherwise only top-level files are processed
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Include only files whose content matches this pattern
    /// (substring search unless --match-mode is regex)
    #[arg(short = 'P', long)]
    pub content_pattern: Option<String>,

    /// Exclude files whose content matches this pattern
    #[arg(short = 'X', long)]
    pub content_exclude_pattern: Option<String>,

    /// Number of lines to read at once when scanning files for content patterns [default: 100]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,
}
