// core/src/utils/mod.rs
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod value;

// Provenance tag stamped on every job unless overridden
pub const DEFAULT_APPLICATION_NAME: &str = "cook-scheduler-cli";
pub const DEFAULT_APPLICATION_VERSION: &str = env!("CARGO_PKG_VERSION");
