use crate::app::cli::Cli;
use crate::app::matchers::{ContentMatcher, PathMatcher};
use crate::app::models::{MatchMode, RuntimeConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory names never descended into during a recursive walk.
pub const DEFAULT_EXCLUDED_DIR_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    "__pycache__",
    "node_modules",
    "dist",
    "build",
    "out",
    "target",
    ".gradle",
    ".mvn",
    ".venv",
    "venv",
];

/// Lowercase extensions (without the dot) never searched for text patterns.
pub const DEFAULT_BINARY_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "pdf", "zip", "tar", "gz", "bz2", "7z", "jar",
    "exe", "dll", "so", "dylib", "class", "bin", "woff", "woff2", "ttf", "otf",
];

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--in should point to a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Both --no-headers and --no-body cannot be set at the same time")]
    NothingToWrite,

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("Failed to resolve path {path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PresetConfig {
    pub pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    pub content_pattern: Option<String>,
    pub content_exclude_pattern: Option<String>,
    pub match_mode: Option<MatchMode>,
    pub recursive: Option<bool>,
    pub batch_size: Option<usize>,
}

pub fn presets_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("fileconcat").join("presets.toml"))
}

/// A missing presets file means "no presets", not an error.
pub fn load_presets_file(config_path: &Path) -> Result<HashMap<String, PresetConfig>> {
    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    parse_presets(&content).context(format!("Failed to parse {:?}", config_path))
}

pub fn parse_presets(content: &str) -> Result<HashMap<String, PresetConfig>> {
    let parsed: PresetsFile = toml::from_str(content)?;
    Ok(parsed.presets)
}

/// Merges CLI args over the selected preset and validates the result.
///
/// The preset is the one named by `--preset`, or else the one named after the
/// input directory, or else none. CLI values win; flags are OR-ed.
pub fn resolve_config(
    cli: Cli,
    presets: &HashMap<String, PresetConfig>,
) -> Result<RuntimeConfig, ConfigError> {
    if !cli.input_dir.is_dir() {
        return Err(ConfigError::NotADirectory(cli.input_dir));
    }
    let input_dir = cli
        .input_dir
        .canonicalize()
        .map_err(|source| ConfigError::Path {
            path: cli.input_dir.clone(),
            source,
        })?;
    let output_file = absolutize(&cli.output_file)?;

    let preset = match cli.preset.as_deref() {
        Some(name) => presets
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?,
        None => input_dir
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| presets.get(n))
            .cloned()
            .unwrap_or_default(),
    };

    let config = RuntimeConfig {
        input_dir,
        output_file,
        recursive: cli.recursive || preset.recursive.unwrap_or(false),
        pattern: non_empty(cli.pattern.or(preset.pattern)),
        exclude_pattern: non_empty(cli.exclude_pattern.or(preset.exclude_pattern)),
        content_pattern: non_empty(cli.content_pattern.or(preset.content_pattern)),
        content_exclude_pattern: non_empty(
            cli.content_exclude_pattern.or(preset.content_exclude_pattern),
        ),
        match_mode: cli.match_mode.or(preset.match_mode).unwrap_or_default(),
        batch_size: cli
            .batch_size
            .or(preset.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE)
            .max(1),
        no_headers: cli.no_headers,
        no_body: cli.no_body,
    };

    config.validate()?;
    Ok(config)
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::NotADirectory(self.input_dir.clone()));
        }
        if self.no_headers && self.no_body {
            return Err(ConfigError::NothingToWrite);
        }
        // Compiling the matchers surfaces regex syntax errors before any traversal.
        PathMatcher::new(
            self.pattern.as_deref(),
            self.exclude_pattern.as_deref(),
            self.match_mode,
        )?;
        ContentMatcher::new(
            self.content_pattern.as_deref(),
            self.content_exclude_pattern.as_deref(),
            self.match_mode,
            self.batch_size,
        )?;
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Makes `path` absolute without requiring it to exist.
fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map_err(|source| ConfigError::Path {
                path: path.to_path_buf(),
                source,
            })?
            .join(path)
    };

    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => Ok(parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or(absolute.clone())),
        _ => Ok(absolute),
    }
}
