//! HTTP adapter: upload/status API and the job worker.

pub mod server;

pub use server::{build_router, serve, spawn_worker, AppState, HttpServerConfig};
