//! Workload registry
//!
//! Maps workload names to factories. The registry is an ordinary value that
//! callers construct and pass around, so tests can build isolated registries.

use std::collections::HashMap;
use std::fmt;

use super::{register_builtin_workloads, Workload};
use crate::{PulseError, Result};

/// Zero-argument constructor for a fresh, uninitialized workload
pub type WorkloadFactory = Box<dyn Fn() -> Box<dyn Workload> + Send + Sync>;

/// Name to factory mapping
#[derive(Default)]
pub struct WorkloadRegistry {
    factories: HashMap<String, WorkloadFactory>,
}

impl WorkloadRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in workloads, with `fileio` scratch
    /// files placed in the OS temp directory
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtin_workloads(&mut registry, std::env::temp_dir());
        registry
    }

    /// Register a factory under `name`
    ///
    /// A later registration for the same name replaces the earlier factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Workload> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            tracing::debug!(workload = %name, "workload factory overridden");
        }
    }

    /// Construct a fresh workload registered under `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn Workload>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| PulseError::WorkloadNotFound(name.to_string()))
    }

    /// All registered names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Number of registered workloads
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for WorkloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkloadRegistry")
            .field("workloads", &self.list())
            .finish()
    }
}
