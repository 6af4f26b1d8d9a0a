//! Version-control adapter for patch application.

pub mod patcher;

pub use patcher::GitPatcher;
