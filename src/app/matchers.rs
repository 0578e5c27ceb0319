use crate::app::config::{ConfigError, DEFAULT_BINARY_EXTENSIONS};
use crate::app::lines::read_line_normalized;
use crate::app::models::{MatchDecision, MatchMode};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// A pattern compiled once for its match mode and reused for every candidate.
#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Substring(String),
    Regex(Regex),
}

impl Pattern {
    pub fn compile(raw: &str, mode: MatchMode) -> Result<Self, ConfigError> {
        Ok(match mode {
            MatchMode::Exact => Pattern::Exact(raw.to_string()),
            MatchMode::Substring => Pattern::Substring(raw.to_string()),
            MatchMode::Regex => {
                let regex = Regex::new(raw).map_err(|source| ConfigError::InvalidRegex {
                    pattern: raw.to_string(),
                    source,
                })?;
                Pattern::Regex(regex)
            }
        })
    }

    /// Empty patterns count as "no filter".
    pub fn compile_optional(
        raw: Option<&str>,
        mode: MatchMode,
    ) -> Result<Option<Self>, ConfigError> {
        raw.filter(|p| !p.is_empty())
            .map(|p| Self::compile(p, mode))
            .transpose()
    }

    /// Regex mode only searches the relative path, never the bare name.
    pub fn matches_path(&self, relative_path: &str, name: &str) -> bool {
        match self {
            Pattern::Exact(p) => relative_path == p || name == p,
            Pattern::Substring(p) => relative_path.contains(p.as_str()) || name.contains(p.as_str()),
            Pattern::Regex(re) => re.is_match(relative_path),
        }
    }

    /// Against file content, exact mode degrades to a substring search.
    ///
    /// A `$` anchor also matches just before the batch's final newline.
    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            Pattern::Exact(p) | Pattern::Substring(p) => text.contains(p.as_str()),
            Pattern::Regex(re) => {
                re.is_match(text)
                    || text
                        .strip_suffix('\n')
                        .is_some_and(|trimmed| re.is_match(trimmed))
            }
        }
    }
}

/// Path-only include/exclude filter. Cheap, never touches the filesystem.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    include: Option<Pattern>,
    exclude: Option<Pattern>,
}

impl PathMatcher {
    pub fn new(
        pattern: Option<&str>,
        exclude_pattern: Option<&str>,
        mode: MatchMode,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            include: Pattern::compile_optional(pattern, mode)?,
            exclude: Pattern::compile_optional(exclude_pattern, mode)?,
        })
    }

    pub fn includes(&self, relative_path: &str, name: &str) -> bool {
        self.include
            .as_ref()
            .map_or(true, |p| p.matches_path(relative_path, name))
    }

    pub fn excludes(&self, relative_path: &str, name: &str) -> bool {
        self.exclude
            .as_ref()
            .map_or(false, |p| p.matches_path(relative_path, name))
    }
}

/// Streams file text in line batches and decides inclusion from its content.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    include: Option<Pattern>,
    exclude: Option<Pattern>,
    batch_size: usize,
}

impl ContentMatcher {
    pub fn new(
        content_pattern: Option<&str>,
        content_exclude_pattern: Option<&str>,
        mode: MatchMode,
        batch_size: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            include: Pattern::compile_optional(content_pattern, mode)?,
            exclude: Pattern::compile_optional(content_exclude_pattern, mode)?,
            batch_size: batch_size.max(1),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.include.is_some() || self.exclude.is_some()
    }

    pub fn check(&self, path: &Path, name: &str) -> MatchDecision {
        if !self.is_enabled() {
            return MatchDecision::accept();
        }

        // Binary content can satisfy neither a text include nor a text exclude.
        if is_binary_name(name) {
            return if self.include.is_some() {
                MatchDecision::reject()
            } else {
                MatchDecision::accept()
            };
        }

        let mut evaluation = ContentEvaluation::new(self.include.as_ref(), self.exclude.as_ref());
        match self.stream(path, &mut evaluation) {
            Ok(()) => evaluation.decision(),
            Err(err) => MatchDecision {
                read_error: Some(err),
                ..MatchDecision::reject()
            },
        }
    }

    /// Feeds batches of `batch_size` lines until the evaluation settles or the
    /// file ends. Line ends are normalized to `\n`. A match spanning two
    /// batches is not seen.
    fn stream(&self, path: &Path, evaluation: &mut ContentEvaluation<'_>) -> io::Result<()> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = Vec::new();
        let mut batch = String::new();
        let mut lines_in_batch = 0;

        loop {
            line.clear();
            if read_line_normalized(&mut reader, &mut line)? == 0 {
                break;
            }
            batch.push_str(&String::from_utf8_lossy(&line));
            lines_in_batch += 1;

            if lines_in_batch >= self.batch_size {
                if evaluation.feed(&batch) {
                    return Ok(());
                }
                batch.clear();
                lines_in_batch = 0;
            }
        }

        if lines_in_batch > 0 {
            evaluation.feed(&batch);
        }
        Ok(())
    }
}

/// Match state for a single file. Created per file, dropped after `decision`.
#[derive(Debug)]
struct ContentEvaluation<'a> {
    include: Option<&'a Pattern>,
    exclude: Option<&'a Pattern>,
    include_matched: bool,
    exclude_matched: bool,
}

impl<'a> ContentEvaluation<'a> {
    fn new(include: Option<&'a Pattern>, exclude: Option<&'a Pattern>) -> Self {
        Self {
            include,
            exclude,
            include_matched: false,
            exclude_matched: false,
        }
    }

    /// Returns true once no further batch can change the outcome.
    fn feed(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        if let Some(pattern) = self.include {
            if !self.include_matched && pattern.matches_text(text) {
                self.include_matched = true;
            }
        }
        if let Some(pattern) = self.exclude {
            if !self.exclude_matched && pattern.matches_text(text) {
                self.exclude_matched = true;
            }
        }

        self.is_settled()
    }

    fn is_settled(&self) -> bool {
        // An include hit is only final when no exclude could still override it.
        self.exclude_matched
            || (self.include.is_some() && self.include_matched && self.exclude.is_none())
    }

    fn decision(&self) -> MatchDecision {
        if self.include.is_some() && !self.include_matched {
            return MatchDecision::reject();
        }
        if self.exclude.is_some() && self.exclude_matched {
            return MatchDecision {
                excluded: true,
                ..MatchDecision::reject()
            };
        }
        MatchDecision::accept()
    }
}

pub fn is_binary_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| DEFAULT_BINARY_EXTENSIONS.contains(&ext.as_str()))
}
