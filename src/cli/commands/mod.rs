//! Per-command execute functions.

pub mod eval;
pub mod list;
pub mod run;
pub mod serve;
pub mod status;
pub mod submit;
