use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// How path and content patterns are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Full-string equality against the relative path or the file name
    #[default]
    Exact,
    /// Containment within the relative path or the file name
    Substring,
    /// Regular expression search within the relative path
    Regex,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchMode::Exact => "exact",
            MatchMode::Substring => "substring",
            MatchMode::Regex => "regex",
        };
        f.write_str(name)
    }
}

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub recursive: bool,
    pub pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    pub content_pattern: Option<String>,
    pub content_exclude_pattern: Option<String>,
    pub match_mode: MatchMode,
    pub batch_size: usize,
    pub no_headers: bool,
    pub no_body: bool,
}

/// A file that passed every filter, handed to the writer in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub relative_path: String, // Always '/'-separated
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub scanned: usize,
    pub matched: usize,
    pub scan_elapsed: Duration,
}

/// Outcome of evaluating one file against the content patterns.
///
/// `included` and `excluded` are reported independently of `read_error`:
/// a file that could not be read is neither included nor excluded, but the
/// error is still carried so the caller can warn about it.
#[derive(Debug, Default)]
pub struct MatchDecision {
    pub included: bool,
    pub excluded: bool,
    pub read_error: Option<io::Error>,
}

impl MatchDecision {
    pub fn accept() -> Self {
        Self {
            included: true,
            ..Self::default()
        }
    }

    pub fn reject() -> Self {
        Self::default()
    }

    pub fn is_accepted(&self) -> bool {
        self.included && !self.excluded
    }

    pub fn had_read_error(&self) -> bool {
        self.read_error.is_some()
    }
}
