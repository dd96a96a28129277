//! Produce a 180-degree rotated copy of a piece-icon set.
//!
//! Every `.png` and `.svg` directly inside the source directory is written to
//! the destination directory under the same name, rotated. One bad file never
//! stops the batch; its outcome is recorded in the returned [`FlipReport`].

pub mod png;
pub mod svg;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::FlipConfig;
use crate::report::{BatchReport, ItemError, Outcome};

#[derive(Debug, Default)]
pub struct FlipReport {
    /// True when the destination directory did not exist and was created.
    pub dest_created: bool,
    pub png: BatchReport,
    pub svg: BatchReport,
}

/// Image files found in the source directory, by kind, sorted by name.
#[derive(Debug, Default, PartialEq)]
pub struct Assets {
    pub png: Vec<String>,
    pub svg: Vec<String>,
}

/// Rotate every PNG and SVG from `config.source_dir` into `config.dest_dir`.
///
/// Errors only when the batch cannot start: the destination cannot be created
/// or the source cannot be listed.
pub fn flip_pieces(config: &FlipConfig) -> Result<FlipReport> {
    let dest_created = !config.dest_dir.exists();
    if dest_created {
        std::fs::create_dir_all(&config.dest_dir)
            .with_context(|| format!("failed to create {}", config.dest_dir.display()))?;
        tracing::info!(dir = %config.dest_dir.display(), "created destination directory");
    }

    let assets = list_assets(&config.source_dir)?;

    let png = run_batch(&assets.png, config, |src, dest| {
        png::rotate_png(src, dest).map(|()| Outcome::Done)
    });
    let svg = run_batch(&assets.svg, config, |src, dest| {
        svg::rotate_svg(src, dest).map(|written| {
            if written {
                Outcome::Done
            } else {
                tracing::warn!(file = %src.display(), "could not find <svg> tag, skipping");
                Outcome::Skipped("no <svg> tag".to_string())
            }
        })
    });

    Ok(FlipReport {
        dest_created,
        png,
        svg,
    })
}

/// List `.png` and `.svg` files (extension case-insensitive) directly in `dir`.
pub fn list_assets(dir: &Path) -> Result<Assets> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read directory {}", dir.display()))?;

    let mut assets = Assets::default();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(file = %path.display(), "skipping non UTF-8 file name");
            continue;
        };

        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".png") {
            assets.png.push(name.to_string());
        } else if lower.ends_with(".svg") {
            assets.svg.push(name.to_string());
        }
    }

    assets.png.sort();
    assets.svg.sort();
    Ok(assets)
}

fn run_batch<F>(names: &[String], config: &FlipConfig, rotate: F) -> BatchReport
where
    F: Fn(&Path, &Path) -> Result<Outcome, ItemError>,
{
    let mut report = BatchReport::default();
    for name in names {
        let src = config.source_dir.join(name);
        let dest = config.dest_dir.join(name);

        let outcome = match rotate(&src, &dest) {
            Ok(outcome) => {
                tracing::debug!(file = %name, ?outcome, "processed");
                outcome
            }
            Err(err) => {
                tracing::error!("{}", err);
                Outcome::Failed(err)
            }
        };
        report.push(name.clone(), outcome);
    }
    report
}
