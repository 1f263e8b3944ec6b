//! File IO workload: append fixed-size blocks to a scratch file
//!
//! Lane safety: all lanes append through one shared append-mode handle and
//! the OS serializes the writes. Once the file grows past its rotation
//! threshold a lane truncates it; two lanes may both truncate, which only
//! discards scratch data. Write failures are counted, never propagated, so a
//! full disk degrades the run instead of aborting the process.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use super::Workload;
use crate::io::ScratchFile;
use crate::{PulseError, Result};

pub const NAME: &str = "fileio";

/// Size of one appended block
pub const BLOCK_SIZE: usize = 64 * 1024;

/// The scratch file is truncated once it holds this many working sets
const ROTATE_FACTOR: u64 = 4;

#[derive(Debug)]
pub struct FileIoWorkload {
    scratch_dir: PathBuf,
    scratch: Option<ScratchFile>,
    buffer: Vec<u8>,
    rotate_at: u64,
    pending_bytes: AtomicU64,
    bytes_written: AtomicU64,
    write_errors: AtomicU64,
}

impl FileIoWorkload {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self {
            scratch_dir,
            scratch: None,
            buffer: Vec::new(),
            rotate_at: 0,
            pending_bytes: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
        }
    }

    /// Total bytes appended over the workload's lifetime
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Number of failed block writes
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    /// Path of the live scratch file, if initialized
    pub fn scratch_path(&self) -> Option<PathBuf> {
        self.scratch.as_ref().map(|s| s.path().to_path_buf())
    }

    fn maybe_rotate(&self, scratch: &ScratchFile, written: u64) {
        let pending = self.pending_bytes.fetch_add(written, Ordering::Relaxed) + written;
        if pending < self.rotate_at {
            return;
        }
        self.pending_bytes.store(0, Ordering::Relaxed);
        if let Err(e) = scratch.truncate() {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(error = %e, "scratch file truncate failed");
        }
    }
}

/// Repeating byte pattern for the write buffer
fn create_test_pattern(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

impl Workload for FileIoWorkload {
    /// The write buffer is `workset_bytes` long and is appended in
    /// [`BLOCK_SIZE`] blocks each batch
    fn init(&mut self, _threads: usize, workset_bytes: usize) -> Result<()> {
        let scratch = ScratchFile::create_in(&self.scratch_dir).map_err(|e| {
            PulseError::BenchmarkError(format!(
                "Failed to create scratch file in {}: {}",
                self.scratch_dir.display(),
                e
            ))
        })?;
        tracing::debug!(path = %scratch.path().display(), "fileio scratch file created");

        self.buffer = create_test_pattern(workset_bytes);
        self.rotate_at = (workset_bytes as u64 * ROTATE_FACTOR).max(BLOCK_SIZE as u64);
        self.scratch = Some(scratch);
        Ok(())
    }

    fn run_batch(&self) -> u64 {
        let Some(scratch) = self.scratch.as_ref() else {
            return 0;
        };

        let mut written = 0u64;
        for block in self.buffer.chunks(BLOCK_SIZE) {
            match scratch.append(block) {
                Ok(()) => written += block.len() as u64,
                Err(e) => {
                    self.write_errors.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(error = %e, "scratch block write failed");
                }
            }
        }
        self.maybe_rotate(scratch, written);
        self.bytes_written.fetch_add(written, Ordering::Relaxed) + written
    }

    fn shutdown(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            if let Err(e) = scratch.sync_data() {
                tracing::debug!(error = %e, "scratch file sync failed");
            }
        }
        let errors = self.write_errors();
        if errors > 0 {
            tracing::warn!(errors, "fileio workload had failed writes");
        }
        self.buffer = Vec::new();
    }

    fn name(&self) -> &str {
        NAME
    }
}
