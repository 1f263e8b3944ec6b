//! Results persistence module
//!
//! Keeps a rotating JSON history of run records.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::RunRecord;
use crate::{PulseError, Result, APP_NAME, MAX_RESULTS_HISTORY, RESULTS_FILE};

/// Results history stored as a single JSON file
#[derive(Debug, Clone)]
pub struct ResultsStorage {
    results_path: PathBuf,
}

/// On-disk layout of the results file
#[derive(Debug, Serialize, Deserialize)]
struct ResultsFile {
    version: u32,
    results: Vec<RunRecord>,
}

impl ResultsStorage {
    /// Storage at the standard location, `$DATA_HOME/pulsebench/results.json`
    pub fn new() -> Result<Self> {
        Ok(Self::at(Self::results_file_path()?))
    }

    /// Storage backed by an explicit file
    pub fn at(results_path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
        }
    }

    /// Get the standard results file path
    pub fn results_file_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            PulseError::ConfigError("Unable to determine data directory".to_string())
        })?;
        Ok(data_dir.join(APP_NAME).join(RESULTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.results_path
    }

    /// Load every stored record, oldest first
    pub fn load_results(&self) -> Result<Vec<RunRecord>> {
        if !self.results_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.results_path).map_err(|e| {
            PulseError::PersistenceError(format!(
                "Failed to read results file {}: {}",
                self.results_path.display(),
                e
            ))
        })?;

        let file: ResultsFile = serde_json::from_str(&content).map_err(|e| {
            PulseError::PersistenceError(format!(
                "Failed to parse results file {}: {}",
                self.results_path.display(),
                e
            ))
        })?;
        Ok(file.results)
    }

    /// Append records, keeping only the newest `MAX_RESULTS_HISTORY`
    pub fn append_results(&self, records: &[RunRecord]) -> Result<()> {
        let mut results = self.load_results()?;
        results.extend_from_slice(records);

        if results.len() > MAX_RESULTS_HISTORY {
            let excess = results.len() - MAX_RESULTS_HISTORY;
            tracing::debug!(dropped = excess, "rotating results history");
            results.drain(..excess);
        }

        self.save_results(results)
    }

    pub fn append_result(&self, record: RunRecord) -> Result<()> {
        self.append_results(std::slice::from_ref(&record))
    }

    fn save_results(&self, results: Vec<RunRecord>) -> Result<()> {
        if let Some(parent) = self.results_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PulseError::PersistenceError(format!(
                    "Failed to create results directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(&ResultsFile {
            version: 1,
            results,
        })?;
        fs::write(&self.results_path, content).map_err(|e| {
            PulseError::PersistenceError(format!(
                "Failed to write results file {}: {}",
                self.results_path.display(),
                e
            ))
        })?;
        Ok(())
    }

    pub fn count_results(&self) -> Result<usize> {
        Ok(self.load_results()?.len())
    }

    /// Remove the results file
    pub fn clear_results(&self) -> Result<()> {
        if self.results_path.exists() {
            fs::remove_file(&self.results_path)?;
        }
        Ok(())
    }

    /// The newest `count` records, oldest first
    pub fn recent_results(&self, count: usize) -> Result<Vec<RunRecord>> {
        let mut results = self.load_results()?;
        let skip = results.len().saturating_sub(count);
        results.drain(..skip);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::record::fixtures::sample_report;
    use tempfile::TempDir;

    fn record(batches: u64) -> RunRecord {
        let mut record = RunRecord::from_report(&sample_report(), 0);
        record.total_batches = batches;
        record
    }

    fn storage_in(dir: &TempDir) -> ResultsStorage {
        ResultsStorage::at(dir.path().join("history").join(RESULTS_FILE))
    }

    #[test]
    fn test_load_empty_results() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        assert!(storage.load_results().unwrap().is_empty());
        assert_eq!(storage.count_results().unwrap(), 0);
    }

    #[test]
    fn test_append_and_load_result() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        storage.append_result(record(7)).unwrap();
        let results = storage.load_results().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0], record(7).with_timestamp(results[0].timestamp));
    }

    #[test]
    fn test_results_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        let batch: Vec<RunRecord> = (0..(MAX_RESULTS_HISTORY + 10) as u64).map(record).collect();
        storage.append_results(&batch).unwrap();

        let results = storage.load_results().unwrap();
        assert_eq!(results.len(), MAX_RESULTS_HISTORY);
        assert_eq!(results[0].total_batches, 10);
        assert_eq!(
            results[results.len() - 1].total_batches,
            (MAX_RESULTS_HISTORY + 9) as u64
        );
    }

    #[test]
    fn test_recent_results() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        for i in 0..10 {
            storage.append_result(record(i)).unwrap();
        }

        let recent = storage.recent_results(5).unwrap();
        assert_eq!(
            recent.iter().map(|r| r.total_batches).collect::<Vec<_>>(),
            vec![5, 6, 7, 8, 9]
        );
        assert_eq!(storage.recent_results(20).unwrap().len(), 10);
    }

    #[test]
    fn test_clear_results() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        storage.append_result(record(1)).unwrap();

        storage.clear_results().unwrap();
        assert_eq!(storage.count_results().unwrap(), 0);
        storage.clear_results().unwrap();
    }

    #[test]
    fn test_results_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        storage.append_result(record(3)).unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        let file: ResultsFile = serde_json::from_str(&content).unwrap();
        assert_eq!(file.version, 1);
        assert_eq!(file.results.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_persistence_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "not json").unwrap();

        assert!(matches!(
            storage.load_results(),
            Err(PulseError::PersistenceError(_))
        ));
    }
}
