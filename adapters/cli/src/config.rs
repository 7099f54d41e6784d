use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use uhi_greening_core::{DEFAULT_GRID_SIZE, DEFAULT_MIN_DISTANCE_M, DEFAULT_SEED, DEFAULT_TOP_K};

/// File consulted when no `--config` flag is given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "uhi-greening.toml";

/// Request defaults and storage locations read from `uhi-greening.toml`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// Cells per axis when a request omits `--grid-size`.
    pub(crate) grid_size: u32,
    /// Seed when a request omits `--seed`.
    pub(crate) seed: u64,
    /// Recommendation count when a request omits `--top-k`.
    pub(crate) top_k: u32,
    /// Minimum spacing in meters when a request omits `--min-distance-m`.
    pub(crate) min_distance_m: f64,
    /// JSON document holding tree reports.
    pub(crate) ledger_path: PathBuf,
    /// Directory receiving uploads.
    pub(crate) uploads_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            seed: DEFAULT_SEED,
            top_k: DEFAULT_TOP_K,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            ledger_path: PathBuf::from("uhi_reports.json"),
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

impl CliConfig {
    /// Loads `explicit` when given, otherwise the default file if it exists.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::CliConfig;

    #[test]
    fn empty_file_keeps_defaults() {
        assert_eq!(CliConfig::parse("").expect("parses"), CliConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = CliConfig::parse(
            r#"
grid_size = 20
min_distance_m = 500.0
ledger_path = "data/reports.json"
"#,
        )
        .expect("parses");

        assert_eq!(config.grid_size, 20);
        assert_eq!(config.min_distance_m, 500.0);
        assert_eq!(config.ledger_path, PathBuf::from("data/reports.json"));
        assert_eq!(config.seed, 42);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::parse("gridsize = 20").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        let error = CliConfig::load(Some(path.as_path())).expect_err("missing");
        assert!(error.to_string().contains("failed to read config"));
    }
}
