use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use uuid::Uuid;

/// Writes `data` to `path` through a uniquely named sibling `.tmp` file and a rename.
///
/// A crash mid-write leaves the previous contents of `path` untouched, and
/// concurrent writers never share a temp file.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let tmp_path = tmp_path_for(path);
    let mut file = File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    file.write_all(data)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to flush {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to move {} into place at {}",
            tmp_path.display(),
            path.display()
        )
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{atomic_write, tmp_path_for};

    #[test]
    fn replaces_contents_and_removes_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("ledger.json");

        atomic_write(&path, b"first").expect("first write");
        atomic_write(&path, b"second").expect("second write");

        assert_eq!(fs::read(&path).expect("read back"), b"second");
        let entries: Vec<_> = fs::read_dir(dir.path().join("nested"))
            .expect("list directory")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("ledger.json")]);
    }

    #[test]
    fn temp_names_are_unique_per_write() {
        let path = std::path::Path::new("reports.json");
        let first = tmp_path_for(path);
        let second = tmp_path_for(path);

        assert_ne!(first, second);
        for tmp in [first, second] {
            let name = tmp.to_string_lossy().into_owned();
            assert!(name.starts_with("reports.json."), "{name}");
            assert!(name.ends_with(".tmp"), "{name}");
        }
    }
}
