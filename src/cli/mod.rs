//! CLI-specific functionality for taskflow
//!
//! Argument parsing and configuration discovery used by the binary.

pub mod args;
pub mod config;

pub use args::{Args, Commands};
pub use config::{ConfigDiscovery, EngineConfig, LoadedConfig};
