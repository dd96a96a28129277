use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub last_modified: ScanConfig,

    #[serde(default)]
    pub flip: FlipConfig,

    #[serde(default)]
    pub script_check: CheckConfig,
}

/// Settings for `last-modified`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Roots to scan, in output order. `.` is written as `root`.
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Extensions counted toward a root's timestamp (case-insensitive, dot optional).
    #[serde(default = "default_extensions")]
    pub track_extensions: Vec<String>,

    /// Directory names never descended into. Dot-prefixed directories are always skipped.
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            track_extensions: default_extensions(),
            ignore_dirs: default_ignore_dirs(),
            output: default_output(),
        }
    }
}

/// Settings for `flip-pieces`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlipConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default = "default_dest_dir")]
    pub dest_dir: PathBuf,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            dest_dir: default_dest_dir(),
        }
    }
}

/// Settings for `check-script`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckConfig {
    #[serde(default = "default_script")]
    pub script: PathBuf,

    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            script: default_script(),
            marker: default_marker(),
        }
    }
}

fn default_roots() -> Vec<PathBuf> {
    [".", "./projects", "./playground", "./cv"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn default_extensions() -> Vec<String> {
    [".html", ".css", ".js", ".jpg", ".png", ".svg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignore_dirs() -> Vec<String> {
    ["node_modules", ".git", "__pycache__", ".idea", ".vscode"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_output() -> PathBuf {
    PathBuf::from("last-modified.json")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(r"D:\personal-website\playground\chinese-chess\game\images\traditional_pieces")
}

fn default_dest_dir() -> PathBuf {
    PathBuf::from(r"D:\personal-website\playground\chinese-chess\game\images\flipped_pieces")
}

fn default_script() -> PathBuf {
    PathBuf::from("game/xiangqi.js")
}

fn default_marker() -> String {
    "let isCCBridge = document.getElementById".to_string()
}

/// Config file looked up in the working directory before the user config.
pub const LOCAL_CONFIG_FILE: &str = "sitetools.toml";

/// User config location: `~/.config/sitetools/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("sitetools")
        .join("config.toml")
}

/// Load config from `config_path`, else `./sitetools.toml`, else the user config.
/// Falls back to built-in defaults when none of them exist.
pub fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(p) => Some(p.clone()),
        None => [PathBuf::from(LOCAL_CONFIG_FILE), default_config_path()]
            .into_iter()
            .find(|p| p.exists()),
    };

    let Some(path) = path.filter(|p| p.exists()) else {
        tracing::debug!("no config file found, using defaults");
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");

    // Expand ~ and $HOME in every configured path
    let home = dirs::home_dir().unwrap_or_default();
    config.last_modified.roots = config
        .last_modified
        .roots
        .into_iter()
        .map(|p| expand_home(p, &home))
        .collect();
    config.last_modified.output = expand_home(config.last_modified.output, &home);
    config.flip.source_dir = expand_home(config.flip.source_dir, &home);
    config.flip.dest_dir = expand_home(config.flip.dest_dir, &home);
    config.script_check.script = expand_home(config.script_check.script, &home);

    Ok(config)
}

/// Like [`load_config`], but a config that cannot be read or parsed is logged
/// and replaced by the defaults, so the commands still run.
pub fn load_config_or_default(config_path: Option<&PathBuf>) -> Config {
    load_config(config_path).unwrap_or_else(|err| {
        tracing::error!("{:#}; using default settings", err);
        Config::default()
    })
}

/// Expand `~` and `$HOME` prefixes to the actual home directory.
pub fn expand_home(path: PathBuf, home: &Path) -> PathBuf {
    let s = path.to_string_lossy();

    if let Some(stripped) = s.strip_prefix("~/") {
        return home.join(stripped);
    }
    if s == "~" {
        return home.to_path_buf();
    }
    if let Some(stripped) = s.strip_prefix("$HOME/") {
        return home.join(stripped);
    }
    if s == "$HOME" {
        return home.to_path_buf();
    }

    path
}
