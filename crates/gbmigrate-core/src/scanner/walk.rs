use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

/// True when the file name ends with one of `extensions` (exact, case-sensitive).
pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => extensions.iter().any(|ext| name.ends_with(ext.as_str())),
        None => false,
    }
}

fn is_ignored(entry: &DirEntry, ignore_patterns: &[Pattern]) -> bool {
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(entry.path()))
}

/// Regular files, and symlinks that resolve to one. Linked directories
/// are never entered.
fn is_regular_file(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    if !entry.path_is_symlink() {
        return false;
    }
    match fs::metadata(entry.path()) {
        Ok(metadata) => metadata.is_file(),
        Err(err) => {
            warn!("Dangling symlink {}: {}", entry.path().display(), err);
            false
        }
    }
}

/// Walk every root and return regular files whose name carries one of
/// `extensions`. Only metadata is read; files are never opened.
/// Symlinked directories are not followed. Unreadable entries are logged and skipped.
pub fn collect_candidate_files(
    root_paths: &[&str],
    extensions: &[String],
    ignore_globs: &[&str],
) -> Vec<PathBuf> {
    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let mut files = Vec::new();

    for root in root_paths {
        let root = Path::new(root);
        if !root.is_dir() {
            warn!("Root path {} is not a directory, skipping", root.display());
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry, &ignore_patterns));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Error walking {}: {}", root.display(), err);
                    continue;
                }
            };

            if is_regular_file(&entry) && matches_extension(entry.path(), extensions) {
                files.push(entry.into_path());
            }
        }
    }

    files
}
