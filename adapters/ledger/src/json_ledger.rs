use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{atomic_write::atomic_write, ReportReceipt, ReportSink, TreeReport, TreeReportInput};

/// Report ledger persisted as a single JSON document.
///
/// Every record re-reads the document and rewrites it while holding an
/// exclusive lock on a sibling `.lock` file, so handles in separate
/// processes sharing one path never hand out the same id or drop a report.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    lock_path: PathBuf,
    document: LedgerDocument,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LedgerDocument {
    next_id: u64,
    reports: Vec<TreeReport>,
}

impl LedgerDocument {
    fn empty() -> Self {
        Self {
            next_id: 1,
            reports: Vec::new(),
        }
    }

    fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("failed to parse report ledger {}", path.display())),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Self::empty()),
            Err(error) => Err(error)
                .with_context(|| format!("failed to read report ledger {}", path.display())),
        }
    }
}

impl JsonFileLedger {
    /// Opens the ledger stored at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lock_path = lock_path_for(&path);
        let document = {
            let lock = RwLock::new(open_lock_file(&lock_path)?);
            let _guard = lock
                .read()
                .with_context(|| format!("failed to lock {}", lock_path.display()))?;
            LedgerDocument::load(&path)?
        };

        log::debug!(
            "opened report ledger {} with {} reports",
            path.display(),
            document.reports.len()
        );
        Ok(Self {
            path,
            lock_path,
            document,
        })
    }

    /// Location of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.document)
            .context("failed to serialize report ledger")?;
        atomic_write(&self.path, &bytes)
    }
}

impl ReportSink for JsonFileLedger {
    fn record(&mut self, report: TreeReportInput) -> Result<ReportReceipt> {
        report.validate()?;

        let mut lock = RwLock::new(open_lock_file(&self.lock_path)?);
        let _guard = lock
            .write()
            .with_context(|| format!("failed to lock {}", self.lock_path.display()))?;
        self.document = LedgerDocument::load(&self.path)?;

        let receipt = ReportReceipt {
            id: self.document.next_id,
            uuid: Uuid::new_v4(),
        };
        self.document.reports.push(TreeReport {
            id: receipt.id,
            uuid: receipt.uuid,
            lat: report.lat,
            lon: report.lon,
            health: report.health,
            notes: report.notes,
        });
        self.document.next_id += 1;

        if let Err(error) = self.persist() {
            let _ = self.document.reports.pop();
            self.document.next_id = receipt.id;
            return Err(error);
        }

        log::info!("recorded tree report {} ({})", receipt.id, receipt.uuid);
        Ok(receipt)
    }

    fn reports(&self) -> Result<Vec<TreeReport>> {
        let lock = RwLock::new(open_lock_file(&self.lock_path)?);
        let _guard = lock
            .read()
            .with_context(|| format!("failed to lock {}", self.lock_path.display()))?;
        Ok(LedgerDocument::load(&self.path)?.reports)
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn open_lock_file(lock_path: &Path) -> Result<File> {
    if let Some(parent) = lock_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("failed to open lock file {}", lock_path.display()))
}
