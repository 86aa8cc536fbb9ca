//! Station Dash - Weather-station dashboard for LI-COR Cloud loggers
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod licor;
pub mod routes;
pub mod sync;
pub mod weather;
