use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::TEMP_FILE_PREFIX;

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Append-only scratch file with automatic cleanup
///
/// Writes go through `&File`, so one handle can be shared by several
/// threads; the file is opened in append mode and the OS serializes appends.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    file: File,
    cleanup_on_drop: bool,
}

impl ScratchFile {
    /// Create a uniquely named scratch file inside `target_dir`
    pub fn create_in(target_dir: &Path) -> io::Result<Self> {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}{}_{}.dat", TEMP_FILE_PREFIX, std::process::id(), seq);
        let path = target_dir.join(name);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.set_len(0)?;

        Ok(Self {
            path,
            file,
            cleanup_on_drop: true,
        })
    }

    /// Append the whole buffer
    pub fn append(&self, buf: &[u8]) -> io::Result<()> {
        (&self.file).write_all(buf)
    }

    /// Discard the file contents; subsequent appends start at offset 0
    pub fn truncate(&self) -> io::Result<()> {
        self.file.set_len(0)
    }

    /// Flush file data to the device
    pub fn sync_data(&self) -> io::Result<()> {
        self.file.sync_data()
    }

    /// Current on-disk length
    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Disable automatic cleanup (for debugging)
    pub fn keep_on_drop(&mut self) {
        self.cleanup_on_drop = false;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.cleanup_on_drop {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scratch_file_cleanup() {
        let temp_dir = tempdir().unwrap();
        let scratch = ScratchFile::create_in(temp_dir.path()).unwrap();
        assert!(scratch.path().exists());

        let path = scratch.path().to_owned();
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_file_keep_on_drop() {
        let temp_dir = tempdir().unwrap();
        let mut scratch = ScratchFile::create_in(temp_dir.path()).unwrap();
        scratch.keep_on_drop();

        let path = scratch.path().to_owned();
        drop(scratch);
        assert!(path.exists());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_unique_names() {
        let temp_dir = tempdir().unwrap();
        let a = ScratchFile::create_in(temp_dir.path()).unwrap();
        let b = ScratchFile::create_in(temp_dir.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_append_and_truncate() {
        let temp_dir = tempdir().unwrap();
        let scratch = ScratchFile::create_in(temp_dir.path()).unwrap();

        scratch.append(&[1u8; 512]).unwrap();
        scratch.append(&[2u8; 512]).unwrap();
        assert_eq!(scratch.len().unwrap(), 1024);

        scratch.truncate().unwrap();
        assert_eq!(scratch.len().unwrap(), 0);

        scratch.append(&[3u8; 100]).unwrap();
        assert_eq!(scratch.len().unwrap(), 100);
    }
}
