use crate::app::config::DEFAULT_EXCLUDED_DIR_NAMES;
use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};

/// Lazily yields the files under `root`, in file-name order within each
/// directory.
///
/// Without `recursive` only direct children are listed. With it, directories
/// named in `DEFAULT_EXCLUDED_DIR_NAMES` are pruned before they are entered.
/// Entries that fail mid-walk come through as `Err` so the caller can warn and
/// carry on.
pub fn walk_files(
    root: &Path,
    recursive: bool,
) -> impl Iterator<Item = Result<PathBuf, ignore::Error>> {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false) // Only the built-in prune set applies, not .gitignore
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    if recursive {
        builder.filter_entry(|entry| !is_pruned_dir(entry));
    } else {
        builder.max_depth(Some(1));
    }

    builder.build().filter_map(|result| match result {
        Ok(entry) if is_file(&entry) => Some(Ok(entry.into_path())),
        Ok(_) => None,
        Err(err) => Some(Err(err)),
    })
}

fn is_pruned_dir(entry: &DirEntry) -> bool {
    // The root is never pruned, whatever its name.
    if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
        return false;
    }

    let pruned = entry
        .file_name()
        .to_str()
        .is_some_and(|name| DEFAULT_EXCLUDED_DIR_NAMES.contains(&name));
    if pruned {
        log::debug!("Pruning {}", entry.path().display());
    }
    pruned
}

fn is_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        // Symlinks count when they resolve to a regular file.
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        _ => false,
    }
}
