use crate::app::lines::read_line_normalized;
use crate::app::models::{FileEntry, RuntimeConfig};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Concatenates `entries` into the configured output file, calling
/// `on_progress(processed, total)` before each file. Returns the time spent.
pub fn write_output(
    config: &RuntimeConfig,
    entries: &[FileEntry],
    mut on_progress: impl FnMut(usize, usize),
) -> Result<Duration> {
    if entries.is_empty() {
        return Ok(Duration::ZERO);
    }
    let start = Instant::now();

    if let Some(parent) = config.output_file.parent() {
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory {:?}", parent))?;
    }
    let file = File::create(&config.output_file)
        .context(format!("Failed to create output file {:?}", config.output_file))?;
    let mut out = BufWriter::new(file);

    for (index, entry) in entries.iter().enumerate() {
        on_progress(index + 1, entries.len());
        write_entry(&mut out, entry, config.no_headers, config.no_body)
            .context(format!("Failed to write {:?}", config.output_file))?;
    }

    out.flush().context("Failed to flush output")?;
    Ok(start.elapsed())
}

fn write_entry<W: Write>(
    out: &mut W,
    entry: &FileEntry,
    no_headers: bool,
    no_body: bool,
) -> io::Result<()> {
    if !no_headers {
        writeln!(out, "# {}", entry.relative_path)?;
    }

    if !no_body {
        if let Some(err) = copy_lossy(&entry.path, out)? {
            log::warn!("Could not read {}: {}", entry.relative_path, err);
            writeln!(out, "[Error reading the file: {}]", err)?;
        }
    }

    writeln!(out)
}

/// Copies `path` into `out` with invalid UTF-8 replaced and line ends
/// normalized to `\n`. Read failures are handed back as `Ok(Some(err))`;
/// only write failures are `Err`.
fn copy_lossy<W: Write>(path: &Path, out: &mut W) -> io::Result<Option<io::Error>> {
    let mut reader = match File::open(path) {
        Ok(file) => BufReader::new(file),
        Err(err) => return Ok(Some(err)),
    };

    let mut line = Vec::new();
    loop {
        line.clear();
        match read_line_normalized(&mut reader, &mut line) {
            Ok(0) => return Ok(None),
            Ok(_) => out.write_all(String::from_utf8_lossy(&line).as_bytes())?,
            Err(err) => return Ok(Some(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::MatchMode;
    use tempfile::TempDir;

    fn entry(dir: &TempDir, rel: &str, body: &[u8]) -> FileEntry {
        let path = dir.path().join(rel);
        fs::write(&path, body).unwrap();
        FileEntry {
            path,
            relative_path: rel.to_string(),
        }
    }

    fn render(entry: &FileEntry, no_headers: bool, no_body: bool) -> String {
        let mut buf = Vec::new();
        write_entry(&mut buf, entry, no_headers, no_body).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_and_body() {
        let dir = TempDir::new().unwrap();
        let e = entry(&dir, "a.txt", b"line1\nline2\n");
        assert_eq!(render(&e, false, false), "# a.txt\nline1\nline2\n\n");
    }

    #[test]
    fn headers_only() {
        let dir = TempDir::new().unwrap();
        let e = entry(&dir, "a.txt", b"ignored\n");
        assert_eq!(render(&e, false, true), "# a.txt\n\n");
    }

    #[test]
    fn body_only() {
        let dir = TempDir::new().unwrap();
        let e = entry(&dir, "a.txt", b"content");
        assert_eq!(render(&e, true, false), "content\n");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        let e = entry(&dir, "a.txt", b"ok \xff\n");
        assert_eq!(render(&e, true, false), "ok \u{FFFD}\n\n");
    }

    #[test]
    fn crlf_and_cr_line_ends_are_written_as_lf() {
        let dir = TempDir::new().unwrap();
        let e = entry(&dir, "dos.txt", b"one\r\ntwo\rthree");
        assert_eq!(render(&e, true, false), "one\ntwo\nthree\n");
    }

    #[test]
    fn unreadable_file_is_reported_inline() {
        let e = FileEntry {
            path: "/definitely/not/here.txt".into(),
            relative_path: "here.txt".into(),
        };
        let out = render(&e, false, false);
        assert!(out.starts_with("# here.txt\n[Error reading the file: "));
        assert!(out.ends_with("]\n\n"));
    }

    #[test]
    fn write_output_creates_parent_dirs_and_reports_progress() {
        let dir = TempDir::new().unwrap();
        let entries = vec![entry(&dir, "a.txt", b"A\n"), entry(&dir, "b.txt", b"B\n")];
        let config = RuntimeConfig {
            input_dir: dir.path().to_path_buf(),
            output_file: dir.path().join("nested/out/result.txt"),
            recursive: false,
            pattern: None,
            exclude_pattern: None,
            content_pattern: None,
            content_exclude_pattern: None,
            match_mode: MatchMode::Exact,
            batch_size: 100,
            no_headers: false,
            no_body: false,
        };

        let mut progress = Vec::new();
        write_output(&config, &entries, |done, total| progress.push((done, total))).unwrap();

        assert_eq!(progress, vec![(1, 2), (2, 2)]);
        let written = fs::read_to_string(&config.output_file).unwrap();
        assert_eq!(written, "# a.txt\nA\n\n# b.txt\nB\n\n");
    }
}
