#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence capabilities that sit beside the scoring engine.
//!
//! The engine never touches these: adapters record tree-health observations
//! through a [`ReportSink`] and keep uploaded imagery in a [`BlobStore`].

use std::{error::Error, fmt, path::PathBuf, str::FromStr};

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod atomic_write;
mod blob_store;
mod json_ledger;

pub use blob_store::DirectoryBlobStore;
pub use json_ledger::JsonFileLedger;

/// Accepts tree-health observations and lists what it has recorded.
pub trait ReportSink {
    /// Persists a report and returns the identifiers assigned to it.
    fn record(&mut self, report: TreeReportInput) -> Result<ReportReceipt>;

    /// Every recorded report in insertion order.
    fn reports(&self) -> Result<Vec<TreeReport>>;
}

/// Stores uploaded bytes and reports where they ended up.
pub trait BlobStore {
    /// Persists `bytes` under `file_name`, replacing any earlier blob of that name.
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Observed condition of a planted tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeHealth {
    /// Thriving.
    Good,
    /// Stressed but alive.
    Fair,
    /// Failing.
    Poor,
}

impl TreeHealth {
    /// Lowercase label used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for TreeHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeHealth {
    type Err = ParseTreeHealthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            _ => Err(ParseTreeHealthError(value.to_owned())),
        }
    }
}

/// Returned when a health label is not one of `good`, `fair` or `poor`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseTreeHealthError(String);

impl fmt::Display for ParseTreeHealthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tree health '{}' is not one of good, fair or poor",
            self.0
        )
    }
}

impl Error for ParseTreeHealthError {}

/// Observation submitted by a field volunteer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeReportInput {
    /// Latitude of the tree in degrees.
    pub lat: f64,
    /// Longitude of the tree in degrees.
    pub lon: f64,
    /// Observed condition.
    pub health: TreeHealth,
    /// Free-form remarks.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TreeReportInput {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat),
            "latitude {} must lie within [-90, 90]",
            self.lat
        );
        ensure!(
            self.lon.is_finite() && (-180.0..=180.0).contains(&self.lon),
            "longitude {} must lie within [-180, 180]",
            self.lon
        );
        Ok(())
    }
}

/// Recorded observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeReport {
    /// Sequential identifier starting at 1.
    pub id: u64,
    /// Globally unique identifier.
    pub uuid: Uuid,
    /// Latitude of the tree in degrees.
    pub lat: f64,
    /// Longitude of the tree in degrees.
    pub lon: f64,
    /// Observed condition.
    pub health: TreeHealth,
    /// Free-form remarks.
    pub notes: Option<String>,
}

/// Identifiers assigned to a freshly recorded report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReceipt {
    /// Sequential identifier.
    pub id: u64,
    /// Globally unique identifier.
    pub uuid: Uuid,
}

#[cfg(test)]
mod tests {
    use super::{TreeHealth, TreeReportInput};

    #[test]
    fn health_labels_parse_case_insensitively() {
        assert_eq!("good".parse::<TreeHealth>(), Ok(TreeHealth::Good));
        assert_eq!(" Fair ".parse::<TreeHealth>(), Ok(TreeHealth::Fair));
        assert_eq!("POOR".parse::<TreeHealth>(), Ok(TreeHealth::Poor));
    }

    #[test]
    fn unknown_health_label_is_rejected() {
        let error = "dead".parse::<TreeHealth>().expect_err("unknown label");
        assert_eq!(
            error.to_string(),
            "tree health 'dead' is not one of good, fair or poor"
        );
    }

    #[test]
    fn out_of_range_coordinates_fail_validation() {
        let report = TreeReportInput {
            lat: 91.0,
            lon: 0.0,
            health: TreeHealth::Good,
            notes: None,
        };
        assert!(report.validate().is_err());

        let report = TreeReportInput {
            lat: 40.0,
            lon: f64::NAN,
            health: TreeHealth::Good,
            notes: None,
        };
        assert!(report.validate().is_err());
    }
}
