use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Scratch directory for one download job's part files and merged output.
///
/// Dropping the workspace removes everything in it, so an interrupted or
/// failed job leaves no partial files behind; only `commit_file` makes a
/// result visible at its final path.
pub(crate) struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("arty-transfer-").tempdir()?;
        Ok(Self { dir })
    }

    pub fn part_path(&self, index: u32) -> PathBuf {
        self.dir.path().join(format!("part.{index}"))
    }

    pub fn merged_path(&self) -> PathBuf {
        self.dir.path().join("merged")
    }
}

/// Move a staged file to its destination, creating intermediate directories
/// only once the content is complete. Falls back to copy + remove when the
/// staging directory is on another filesystem.
pub(crate) fn commit_file(staged: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match std::fs::rename(staged, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(staged, dest)?;
            std::fs::remove_file(staged)
        }
    }
}
