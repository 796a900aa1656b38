//! Common utilities, types, and configuration shared across shardflow crates.
//!
//! This crate contains the base building blocks for the shardflow executor:
//! - **Configuration**: Strongly typed settings with file/env layering (`config`).
//! - **Resilience**: Exponential backoff for connection acquisition (`retry`).
//! - **Telemetry**: Structured logging setup (`telemetry`).
pub mod config;
pub mod retry;
pub mod telemetry;
