use crate::tools::checksum::Algorithm;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "safe-toolkit.toml";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub root: Root,
    pub logging: Logging,
    pub sandbox: Sandbox,
    pub checksum: Checksum,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Root {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
}
fn default_root_dir() -> PathBuf { PathBuf::from(".") }

impl Default for Root {
    fn default() -> Self { Self { root_dir: default_root_dir() } }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}
fn default_level() -> String { "warn".to_string() }

impl Default for Logging {
    fn default() -> Self { Self { level: default_level(), json: false } }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Sandbox {
    /// Reject symlinked directories anywhere below the root, not just at the final segment.
    #[serde(default)]
    pub reject_intermediate_symlinks: bool,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Checksum {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub default_algorithm: Algorithm,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    /// Explicit path first, then `safe-toolkit.toml` in the working directory, then defaults.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.root.root_dir.is_dir() {
            anyhow::bail!("root_dir does not exist or is not a directory: {}", self.root.root_dir.display());
        }
        if self.logging.level.trim().is_empty() { anyhow::bail!("logging level must not be empty"); }
        Ok(())
    }
}

pub fn canonical_root(root: &Path) -> anyhow::Result<PathBuf> {
    let c = dunce::canonicalize(root)?;
    Ok(c)
}
