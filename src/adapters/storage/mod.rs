//! Persistence adapters.

pub mod fs_jobs;

pub use fs_jobs::FsJobRepository;
