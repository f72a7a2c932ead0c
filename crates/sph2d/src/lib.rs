//! # sph2d - 2D SPH fluid simulation host
//!
//! Layered configuration, scripted scenarios and run reports on top of
//! `sph2d-core`.

pub mod config;
pub mod scenario;
pub mod summary;

pub use config::SimConfig;
pub use summary::StateSummary;
