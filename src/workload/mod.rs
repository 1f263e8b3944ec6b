//! Workload contract and built-in workloads
//!
//! A workload is a repeatable unit of CPU, memory or IO work. The driver
//! initializes one instance, shares it by reference across every worker lane
//! while the run is live, and shuts it down once all lanes have joined.

use std::path::PathBuf;

use crate::Result;

pub mod fileio;
pub mod math;
pub mod memcopy;
pub mod primes;
pub mod registry;

pub use fileio::FileIoWorkload;
pub use math::SimdWorkload;
pub use memcopy::MemCopyWorkload;
pub use primes::PrimesWorkload;
pub use registry::{WorkloadFactory, WorkloadRegistry};

/// Lifecycle contract every workload implements
///
/// `run_batch` takes `&self` and may be called from many lanes at once, so
/// each implementation documents how its shared state tolerates that.
pub trait Workload: Send + Sync {
    /// Allocate the working set. Called exactly once, before any batch.
    fn init(&mut self, threads: usize, workset_bytes: usize) -> Result<()>;

    /// Perform one bounded unit of work and return an anti-optimization counter
    fn run_batch(&self) -> u64;

    /// Release the working set. Called exactly once, after every lane stopped.
    fn shutdown(&mut self);

    /// Stable identifier matching the registry key
    fn name(&self) -> &str;
}

/// Register the built-in workloads, placing `fileio` scratch files in `scratch_dir`
pub fn register_builtin_workloads(registry: &mut WorkloadRegistry, scratch_dir: PathBuf) {
    registry.register(math::NAME, || Box::new(SimdWorkload::new()) as Box<dyn Workload>);
    registry.register(memcopy::NAME, || {
        Box::new(MemCopyWorkload::new()) as Box<dyn Workload>
    });
    registry.register(primes::NAME, || Box::new(PrimesWorkload::new()) as Box<dyn Workload>);
    registry.register(fileio::NAME, move || {
        Box::new(FileIoWorkload::new(scratch_dir.clone())) as Box<dyn Workload>
    });
}
