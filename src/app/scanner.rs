use crate::app::config::ConfigError;
use crate::app::matchers::{ContentMatcher, PathMatcher};
use crate::app::models::{FileEntry, RuntimeConfig, ScanStats};
use crate::app::walker::walk_files;
use pathdiff::diff_paths;
use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};

/// Default minimum time between two progress callbacks.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Receives scan events. Every method defaults to doing nothing.
pub trait ScanObserver {
    fn on_progress(&mut self, _scanned: usize, _elapsed: Duration) {}

    fn on_warning(&mut self, _relative_path: &str, _error: Option<&dyn Error>) {}

    fn on_finished(&mut self, _stats: &ScanStats) {}
}

/// Observer that discards everything.
pub struct Silent;

impl ScanObserver for Silent {}

pub struct Scanner<'a> {
    config: &'a RuntimeConfig,
    path_matcher: PathMatcher,
    content_matcher: ContentMatcher,
    progress_interval: Duration,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a RuntimeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            path_matcher: PathMatcher::new(
                config.pattern.as_deref(),
                config.exclude_pattern.as_deref(),
                config.match_mode,
            )?,
            content_matcher: ContentMatcher::new(
                config.content_pattern.as_deref(),
                config.content_exclude_pattern.as_deref(),
                config.match_mode,
                config.batch_size,
            )?,
            progress_interval: PROGRESS_INTERVAL,
        })
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Walks the input directory and returns the accepted files in traversal
    /// order along with the scan statistics.
    pub fn scan(&self, observer: &mut dyn ScanObserver) -> (Vec<FileEntry>, ScanStats) {
        let root = &self.config.input_dir;
        let mut stats = ScanStats::default();
        let mut entries = Vec::new();

        let start = Instant::now();
        let mut last_update = start;

        for result in walk_files(root, self.config.recursive) {
            let path = match result {
                Ok(path) => path,
                Err(err) => {
                    log::warn!("Error walking entry: {}", err);
                    let location = err_location(&err, root);
                    observer.on_warning(&location, Some(&err));
                    continue;
                }
            };

            stats.scanned += 1;

            let now = Instant::now();
            if now.duration_since(last_update) >= self.progress_interval {
                observer.on_progress(stats.scanned, now.duration_since(start));
                last_update = now;
            }

            // Never read back our own output.
            if path == self.config.output_file {
                continue;
            }

            if let Some(entry) = self.process_file(&path, observer) {
                entries.push(entry);
            }
        }

        stats.matched = entries.len();
        stats.scan_elapsed = start.elapsed();
        observer.on_finished(&stats);

        (entries, stats)
    }

    /// Path filters first, content second: the content check is the only one
    /// that reads the file.
    fn process_file(&self, path: &Path, observer: &mut dyn ScanObserver) -> Option<FileEntry> {
        let relative_path = relative_str(path, &self.config.input_dir)?;
        let name = path.file_name()?.to_string_lossy();

        if !self.path_matcher.includes(&relative_path, &name) {
            return None;
        }
        if self.path_matcher.excludes(&relative_path, &name) {
            return None;
        }

        let decision = self.content_matcher.check(path, &name);
        if let Some(err) = &decision.read_error {
            log::warn!("Could not read {}: {}", relative_path, err);
            observer.on_warning(&relative_path, Some(err));
        }
        if !decision.is_accepted() {
            log::debug!("Rejected by content: {}", relative_path);
            return None;
        }

        Some(FileEntry {
            path: path.to_path_buf(),
            relative_path,
        })
    }
}

/// Relative path with '/' separators regardless of platform.
fn relative_str(path: &Path, root: &Path) -> Option<String> {
    let relative = diff_paths(path, root)?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

fn err_location(err: &ignore::Error, root: &Path) -> String {
    match err {
        ignore::Error::WithPath { path, .. } => {
            relative_str(path, root).unwrap_or_else(|| path.display().to_string())
        }
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            err_location(err, root)
        }
        _ => root.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::MatchMode;
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &Path) -> RuntimeConfig {
        RuntimeConfig {
            input_dir: root.canonicalize().unwrap(),
            output_file: root.canonicalize().unwrap().join("out.txt"),
            recursive: true,
            pattern: None,
            exclude_pattern: None,
            content_pattern: None,
            content_exclude_pattern: None,
            match_mode: MatchMode::Exact,
            batch_size: 100,
            no_headers: false,
            no_body: false,
        }
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<usize>,
        warnings: Vec<String>,
        finished: Option<ScanStats>,
    }

    impl ScanObserver for Recorder {
        fn on_progress(&mut self, scanned: usize, _elapsed: Duration) {
            self.progress.push(scanned);
        }

        fn on_warning(&mut self, relative_path: &str, _error: Option<&dyn Error>) {
            self.warnings.push(relative_path.to_string());
        }

        fn on_finished(&mut self, stats: &ScanStats) {
            self.finished = Some(*stats);
        }
    }

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.relative_path.as_str()).collect()
    }

    #[test]
    fn output_file_is_skipped_but_counted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("out.txt"), "previous run").unwrap();

        let cfg = config(dir.path());
        let (entries, stats) = Scanner::new(&cfg).unwrap().scan(&mut Silent);
        assert_eq!(names(&entries), vec!["a.txt"]);
        assert_eq!(stats.scanned, 2);
        assert_eq!(stats.matched, 1);
    }

    #[test]
    fn path_exclude_applies_after_include() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        fs::write(dir.path().join("src/lib_test.rs"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();

        let mut cfg = config(dir.path());
        cfg.match_mode = MatchMode::Substring;
        cfg.pattern = Some(".rs".into());
        cfg.exclude_pattern = Some("_test".into());

        let (entries, stats) = Scanner::new(&cfg).unwrap().scan(&mut Silent);
        assert_eq!(names(&entries), vec!["src/lib.rs"]);
        assert_eq!(stats.scanned, 3);
    }

    #[test]
    fn unreadable_candidate_is_warned_and_dropped() {
        let dir = TempDir::new().unwrap();
        let cfg = RuntimeConfig {
            content_pattern: Some("needle".into()),
            ..config(dir.path())
        };
        let scanner = Scanner::new(&cfg).unwrap();
        let mut recorder = Recorder::default();
        let gone = cfg.input_dir.join("gone.txt");
        let entry = scanner.process_file(&gone, &mut recorder);
        assert!(entry.is_none());
        assert_eq!(recorder.warnings, vec!["gone.txt"]);
    }

    #[test]
    fn finished_callback_receives_final_stats() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let cfg = config(dir.path());
        let mut recorder = Recorder::default();
        let (_, stats) = Scanner::new(&cfg).unwrap().scan(&mut recorder);
        assert_eq!(recorder.finished, Some(stats));
    }

    #[test]
    fn progress_is_reported_once_the_interval_elapses() {
        let dir = TempDir::new().unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let cfg = config(dir.path());

        let mut every_file = Recorder::default();
        Scanner::new(&cfg)
            .unwrap()
            .with_progress_interval(Duration::ZERO)
            .scan(&mut every_file);
        assert_eq!(every_file.progress, vec![1, 2, 3]);

        let mut gated = Recorder::default();
        Scanner::new(&cfg)
            .unwrap()
            .with_progress_interval(Duration::from_secs(3600))
            .scan(&mut gated);
        assert!(gated.progress.is_empty());
        assert_eq!(gated.finished.map(|s| s.scanned), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_warned_and_siblings_still_scanned() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sibling.txt"), "kept").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "unseen").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root; nothing to observe then.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let cfg = config(dir.path());
        let mut recorder = Recorder::default();
        let (entries, stats) = Scanner::new(&cfg).unwrap().scan(&mut recorder);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(names(&entries), vec!["sibling.txt"]);
        assert_eq!(stats.scanned, 1);
        assert!(recorder.warnings.iter().any(|w| w == "locked"));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/data/in");
        assert_eq!(
            relative_str(Path::new("/data/in/a/b/c.txt"), root).as_deref(),
            Some("a/b/c.txt")
        );
    }
}
