use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use sitetools::config::{self, CheckConfig, Config};
use sitetools::last_modified::{self, RootOutcome};
use sitetools::report::{BatchReport, Outcome};
use sitetools::rotate;
use sitetools::script_check::{self, CheckOutcome};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sitetools",
    about = "Build-time helpers for the personal website"
)]
struct Cli {
    /// Path to config file (default: ./sitetools.toml, then ~/.config/sitetools/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write last-modified.json with the newest file time per site directory
    LastModified {
        /// Output file (default: last-modified.json)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Directories to scan (overrides config roots)
        #[arg(long = "dir", value_name = "PATH")]
        dirs: Vec<PathBuf>,
    },

    /// Copy every PNG/SVG piece icon rotated by 180 degrees
    FlipPieces {
        #[arg(long, value_name = "PATH")]
        source: Option<PathBuf>,

        #[arg(long, value_name = "PATH")]
        dest: Option<PathBuf>,

        /// Skip the board script check that runs after the batch
        #[arg(long)]
        no_check: bool,
    },

    /// Check the board script for the CCBridge switch
    CheckScript {
        #[arg(long, value_name = "PATH")]
        script: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut cfg: Config = config::load_config_or_default(cli.config.as_ref());

    match cli.command {
        Command::LastModified { output, dirs } => {
            if let Some(output) = output {
                cfg.last_modified.output = output;
            }
            // CLI --dir overrides configured roots
            if !dirs.is_empty() {
                cfg.last_modified.roots = dirs;
            }
            run_last_modified(&cfg);
        }
        Command::FlipPieces {
            source,
            dest,
            no_check,
        } => {
            if let Some(source) = source {
                cfg.flip.source_dir = source;
            }
            if let Some(dest) = dest {
                cfg.flip.dest_dir = dest;
            }
            run_flip_pieces(&cfg);
            if !no_check {
                run_script_check(&cfg.script_check);
            }
            println!();
            println!("All operations completed!");
        }
        Command::CheckScript { script } => {
            if let Some(script) = script {
                cfg.script_check.script = script;
            }
            run_script_check(&cfg.script_check);
        }
    }

    Ok(())
}

fn setup_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "sitetools=info,warn",
        _ => "sitetools=debug,info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ─── last-modified ──────────────────────────────────────────────────────────

fn run_last_modified(cfg: &Config) {
    let report = last_modified::scan_roots(&cfg.last_modified);

    for outcome in &report.roots {
        match outcome {
            RootOutcome::Scanned(scan) => println!(
                "Latest modification in {}: {}",
                scan.root.display(),
                last_modified::format_timestamp(scan.latest_ms)
            ),
            RootOutcome::Failed { root, error } => {
                println!("Error processing directory {}: {:#}", root.display(), error)
            }
        }
    }

    let output = &cfg.last_modified.output;
    match last_modified::write_report(&report, output) {
        Ok(()) => println!("Successfully generated {}", output.display()),
        Err(e) => tracing::error!("{:#}", e),
    }
}

// ─── flip-pieces ────────────────────────────────────────────────────────────

fn run_flip_pieces(cfg: &Config) {
    let flip = &cfg.flip;
    match rotate::flip_pieces(flip) {
        Ok(report) => {
            if report.dest_created {
                println!("Created directory: {}", flip.dest_dir.display());
            }
            print_batch("PNG", &flip.source_dir, &report.png);
            print_batch("SVG", &flip.source_dir, &report.svg);
        }
        Err(e) => tracing::error!("{:#}", e),
    }
}

fn print_batch(kind: &str, source: &Path, report: &BatchReport) {
    if report.is_empty() {
        println!("No {} files found in {}", kind, source.display());
        return;
    }

    println!("Found {} {} files to process", report.len(), kind);
    for item in &report.items {
        match &item.outcome {
            Outcome::Done => println!("Rotated and saved {}: {}", kind, item.name),
            Outcome::Skipped(reason) => println!("Skipped {} {}: {}", kind, item.name, reason),
            Outcome::Failed(err) => println!("Error processing {} {}: {}", kind, item.name, err),
        }
    }
    println!(
        "{}: {} rotated, {} skipped, {} failed",
        kind,
        report.succeeded(),
        report.skipped(),
        report.failed()
    );
}

// ─── check-script ───────────────────────────────────────────────────────────

fn run_script_check(cfg: &CheckConfig) {
    match script_check::check_script(cfg) {
        Ok(CheckOutcome::MarkerFound) => {
            println!("Found isCCBridge check in {}", cfg.script.display());
            println!();
            println!("{}", script_check::GUIDANCE);
            println!();
        }
        Ok(CheckOutcome::MarkerAbsent) => {
            tracing::info!(script = %cfg.script.display(), "marker not present")
        }
        Ok(CheckOutcome::Missing) => {
            tracing::warn!(script = %cfg.script.display(), "script not found, nothing to check")
        }
        Err(e) => tracing::error!("{:#}", e),
    }
}
