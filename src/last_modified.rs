use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::config::ScanConfig;
use crate::report::ItemError;
use crate::scanner::find_tracked_files;

/// Result of scanning a single root.
#[derive(Debug)]
pub struct RootScan {
    pub root: PathBuf,
    pub key: String,
    /// Number of tracked files found.
    pub files: usize,
    /// Latest modification time in epoch milliseconds, `0` when nothing was tracked.
    pub latest_ms: i64,
    /// Files whose modification time could not be read.
    pub unreadable: Vec<ItemError>,
}

#[derive(Debug)]
pub enum RootOutcome {
    Scanned(RootScan),
    /// Traversal of the root itself failed; no entry is written for it.
    Failed { root: PathBuf, error: anyhow::Error },
}

/// Outcomes for every configured root, in configuration order.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub roots: Vec<RootOutcome>,
}

impl ScanReport {
    /// The `last-modified.json` payload. Later roots with the same key overwrite
    /// earlier values but keep the first position.
    pub fn timestamps(&self) -> IndexMap<String, i64> {
        let mut map = IndexMap::new();
        for outcome in &self.roots {
            if let RootOutcome::Scanned(scan) = outcome {
                map.insert(scan.key.clone(), scan.latest_ms);
            }
        }
        map
    }

    pub fn failed(&self) -> usize {
        self.roots
            .iter()
            .filter(|o| matches!(o, RootOutcome::Failed { .. }))
            .count()
    }
}

/// Scan every configured root. Failures are recorded per root, never propagated.
pub fn scan_roots(config: &ScanConfig) -> ScanReport {
    let roots = config
        .roots
        .iter()
        .map(|root| match latest_modification(root, config) {
            Ok(scan) => RootOutcome::Scanned(scan),
            Err(error) => {
                tracing::error!(root = %root.display(), "{:#}", error);
                RootOutcome::Failed {
                    root: root.clone(),
                    error,
                }
            }
        })
        .collect();

    ScanReport { roots }
}

/// Find the newest tracked file under `root`.
pub fn latest_modification(root: &Path, config: &ScanConfig) -> Result<RootScan> {
    let files = find_tracked_files(root, config)?;
    let mut latest_ms = 0i64;
    let mut unreadable = Vec::new();

    for file in &files {
        match modified_ms(file) {
            Ok(ms) => {
                if ms > latest_ms {
                    latest_ms = ms;
                }
            }
            Err(err) => {
                tracing::warn!("{}", err);
                unreadable.push(err);
            }
        }
    }

    tracing::debug!(root = %root.display(), files = files.len(), latest_ms, "scanned root");

    Ok(RootScan {
        root: root.to_path_buf(),
        key: root_key(root),
        files: files.len(),
        latest_ms,
        unreadable,
    })
}

/// Output key for a root: `root` for the base directory, otherwise the path
/// without its leading `./`.
pub fn root_key(root: &Path) -> String {
    let s = root.to_string_lossy();
    let trimmed = s.trim_start_matches("./").trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        "root".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Modification time of `path` in epoch milliseconds.
pub fn modified_ms(path: &Path) -> std::result::Result<i64, ItemError> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| ItemError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(DateTime::<Utc>::from(modified).timestamp_millis())
}

/// Format epoch milliseconds as local `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => ms.to_string(),
    }
}

/// Write the timestamps as pretty-printed JSON (2-space indent).
pub fn write_report(report: &ScanReport, path: &Path) -> Result<()> {
    let mut json = serde_json::to_string_pretty(&report.timestamps())?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use filetime::FileTime;
    use std::fs;

    fn file_at(path: &Path, ms: i64) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
        let t = FileTime::from_unix_time(ms / 1000, ((ms % 1000) * 1_000_000) as u32);
        filetime::set_file_mtime(path, t).unwrap();
    }

    fn ms(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_root_key() {
        assert_eq!(root_key(Path::new(".")), "root");
        assert_eq!(root_key(Path::new("./")), "root");
        assert_eq!(root_key(Path::new("./projects")), "projects");
        assert_eq!(root_key(Path::new("./playground/chess")), "playground/chess");
        assert_eq!(root_key(Path::new("cv/")), "cv");
    }

    #[test]
    fn test_latest_picks_newest_tracked_file() {
        let base = tempfile::tempdir().unwrap();
        file_at(&base.path().join("a.html"), ms(2023, 1, 1));
        file_at(&base.path().join("img/b.png"), ms(2023, 6, 15));
        // Newer, but untracked or ignored
        file_at(&base.path().join("notes.txt"), ms(2024, 1, 1));
        file_at(&base.path().join("node_modules/x.js"), ms(2024, 2, 1));

        let scan = latest_modification(base.path(), &ScanConfig::default()).unwrap();
        assert_eq!(scan.files, 2);
        assert_eq!(scan.latest_ms, ms(2023, 6, 15));
        assert!(scan.unreadable.is_empty());
    }

    #[test]
    fn test_empty_root_records_zero() {
        let base = tempfile::tempdir().unwrap();
        fs::write(base.path().join("readme.md"), "x").unwrap();

        let scan = latest_modification(base.path(), &ScanConfig::default()).unwrap();
        assert_eq!(scan.files, 0);
        assert_eq!(scan.latest_ms, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_does_not_abort_root() {
        let base = tempfile::tempdir().unwrap();
        file_at(&base.path().join("a.html"), ms(2023, 4, 20));
        std::os::unix::fs::symlink(base.path().join("gone.html"), base.path().join("b.html"))
            .unwrap();

        let scan = latest_modification(base.path(), &ScanConfig::default()).unwrap();
        assert_eq!(scan.files, 2);
        assert_eq!(scan.unreadable.len(), 1);
        assert!(matches!(
            &scan.unreadable[0],
            ItemError::Metadata { path, .. } if path.ends_with("b.html")
        ));
        assert_eq!(scan.latest_ms, ms(2023, 4, 20));
    }

    #[test]
    fn test_failed_root_is_omitted() {
        let base = tempfile::tempdir().unwrap();
        file_at(&base.path().join("index.html"), ms(2023, 3, 3));

        let config = ScanConfig {
            roots: vec![base.path().to_path_buf(), base.path().join("missing")],
            ..ScanConfig::default()
        };
        let report = scan_roots(&config);
        assert_eq!(report.roots.len(), 2);
        assert_eq!(report.failed(), 1);

        let map = report.timestamps();
        assert_eq!(map.len(), 1);
        assert_eq!(map.values().next(), Some(&ms(2023, 3, 3)));
    }

    #[test]
    fn test_format_timestamp_shape() {
        let s = format_timestamp(ms(2023, 6, 15));
        assert_eq!(s.len(), "2023-06-15 12:00:00".len());
        assert!(s.starts_with("2023-06-1"), "{s}");
    }

    #[test]
    fn test_write_report_pretty_and_ordered() {
        let report = ScanReport {
            roots: vec![
                RootOutcome::Scanned(RootScan {
                    root: PathBuf::from("."),
                    key: "root".into(),
                    files: 1,
                    latest_ms: 20,
                    unreadable: Vec::new(),
                }),
                RootOutcome::Scanned(RootScan {
                    root: PathBuf::from("./cv"),
                    key: "cv".into(),
                    files: 0,
                    latest_ms: 0,
                    unreadable: Vec::new(),
                }),
            ],
        };
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("last-modified.json");
        write_report(&report, &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text, "{\n  \"root\": 20,\n  \"cv\": 0\n}\n");
    }

    #[test]
    fn test_write_report_bad_path_errors() {
        let report = ScanReport::default();
        let err = write_report(&report, Path::new("/nonexistent/dir/out.json"));
        assert!(err.is_err());
    }
}
