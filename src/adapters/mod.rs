//! Adapters: implementations of the domain ports against real tools and
//! services.

pub mod analyzers;
pub mod git;
pub mod http;
pub mod model;
pub mod storage;
pub mod test_runners;
