//! Atomic output files.
//!
//! Decryption streams candidate plaintext before the tag check can run, and
//! an interrupted encryption would otherwise leave a truncated container. All
//! output therefore goes through a [`PendingFile`]: bytes land in a temporary
//! file next to the target, and only [`PendingFile::commit`] renames it into
//! place. If a crash or failure happens first, the target path is untouched
//! and the temporary file is removed on drop.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use getrandom::fill;

pub struct PendingFile {
    file: Option<File>,
    tmp_path: PathBuf,
    path: PathBuf,
}

impl PendingFile {
    /// Opens a temporary file in the target's directory, creating parent
    /// directories if needed.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = random_tmp_path(path)?;

        // fail if the temp name already exists
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;

        Ok(Self {
            file: Some(file),
            tmp_path,
            path: path.to_path_buf(),
        })
    }

    /// Syncs the temporary file and atomically renames it to the target path,
    /// replacing any existing file, then syncs the parent directory so the
    /// rename itself is persisted.
    pub fn commit(mut self) -> io::Result<()> {
        let file = self.file.take().expect("commit called once");
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                File::open(parent)?.sync_all()?;
            }
        }

        Ok(())
    }
}

impl Write for PendingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.as_mut().expect("file open").write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.as_mut().expect("file open").flush()
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

/// Generates a unique temporary file path in the same directory.
///
/// Uses cryptographically secure random bytes to avoid name collisions.
/// Format: `filename.tmp.<randomhex>`
fn random_tmp_path(path: &Path) -> io::Result<PathBuf> {
    let mut buf = [0u8; 8]; // 64 bit entropy
    fill(&mut buf).map_err(|_| io::Error::other("OS random generator unavailable"))?;

    let rand_string = buf.iter().map(|b| format!("{:02x}", b)).collect::<String>();

    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("output path has no file name"))?
        .to_string_lossy();

    Ok(path.with_file_name(format!("{}.tmp.{}", file_name, rand_string)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn commit_materializes_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut pending = PendingFile::create(&path).unwrap();
        pending.write_all(b"payload").unwrap();
        pending.commit().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn drop_without_commit_leaves_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        {
            let mut pending = PendingFile::create(&path).unwrap();
            pending.write_all(b"half-written").unwrap();
        }

        assert!(!path.exists());
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn commit_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        fs::write(&path, b"old").unwrap();

        let mut pending = PendingFile::create(&path).unwrap();
        pending.write_all(b"new").unwrap();
        pending.commit().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn target_is_untouched_until_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        fs::write(&path, b"old").unwrap();

        let mut pending = PendingFile::create(&path).unwrap();
        pending.write_all(b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"old");
        pending.commit().unwrap();
    }

    #[test]
    fn tmp_file_is_removed_after_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut pending = PendingFile::create(&path).unwrap();
        pending.write_all(b"data").unwrap();
        pending.commit().unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "out.bin");
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("out.bin");

        let mut pending = PendingFile::create(&nested).unwrap();
        pending.write_all(b"data").unwrap();
        pending.commit().unwrap();

        assert!(nested.exists());
    }

    #[test]
    fn tmp_names_are_unique() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let a = random_tmp_path(&path).unwrap();
        let b = random_tmp_path(&path).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.parent(), path.parent());
    }
}
