//! Ports: contracts between the domain and the outside world.
//!
//! Every hard problem in this pipeline is delegated to an external
//! collaborator with a simple contract: analyzer (path -> findings),
//! model (prompt -> candidate diffs), patcher (diff + tree ->
//! applied/conflict), test runner (path -> pass/fail + logs).

pub mod analyzer;
pub mod job_repository;
pub mod model_client;
pub mod patcher;
pub mod test_runner;

pub use analyzer::Analyzer;
pub use job_repository::{JobPoll, JobRepository};
pub use model_client::{ModelClient, PatchRequest};
pub use patcher::Patcher;
pub use test_runner::TestRunner;
