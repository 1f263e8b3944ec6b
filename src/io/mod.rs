//! Scratch file support for IO workloads

pub mod scratch;

pub use scratch::ScratchFile;
