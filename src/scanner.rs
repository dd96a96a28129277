use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::ScanConfig;

/// Recursively collect every tracked file under `root`.
///
/// Directories named in `ignore_dirs` or starting with `.` are pruned before
/// descending. An unreadable `root` is an error; an unreadable subdirectory is
/// logged and skipped.
pub fn find_tracked_files(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>> {
    let skip_set: HashSet<&str> = config.ignore_dirs.iter().map(String::as_str).collect();
    let extensions = normalize_extensions(&config.track_extensions);

    let entries = std::fs::read_dir(root)
        .with_context(|| format!("cannot read directory {}", root.display()))?;

    let mut files = Vec::new();
    visit_entries(entries, &skip_set, &extensions, &mut files);

    files.sort();
    Ok(files)
}

fn scan_dir(
    dir: &Path,
    skip_set: &HashSet<&str>,
    extensions: &HashSet<String>,
    files: &mut Vec<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return;
        }
    };
    visit_entries(entries, skip_set, extensions, files);
}

fn visit_entries(
    entries: std::fs::ReadDir,
    skip_set: &HashSet<&str>,
    extensions: &HashSet<String>,
    files: &mut Vec<PathBuf>,
) {
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            // Non UTF-8 names are still descended into.
            let name = entry.file_name();

            // Hidden directories (names starting with `.`)
            if name.as_encoded_bytes().starts_with(b".") {
                continue;
            }
            if skip_set.contains(&*name.to_string_lossy()) {
                continue;
            }

            scan_dir(&path, skip_set, extensions, files);
            continue;
        }

        // Symlinked directories are listed but never followed.
        if file_type.is_symlink() && path.is_dir() {
            continue;
        }

        if has_extension(&path, extensions) {
            files.push(path);
        }
    }
}

fn normalize_extensions(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

/// Extension check against a normalized set (lowercase, no leading dot).
fn has_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_ascii_lowercase()))
        .unwrap_or(false)
}
