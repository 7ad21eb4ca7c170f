//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Explicit `--config` path
//! 2. Current directory: ./taskflow.toml or ./.taskflow/config.toml
//! 3. Built-in defaults

use crate::env;
use crate::error::{EngineError, EngineResult};
use crate::task::{ListenerCategory, StrategyKind, TaskManagerConfig};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: StrategyKind,
    pub max_concurrency: Option<usize>,
    /// Listeners attached to the manager, in notification order
    pub listeners: Vec<ListenerCategory>,
    pub log_filter: String,
    pub report_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Concurrent,
            max_concurrency: None,
            listeners: vec![
                ListenerCategory::Logging,
                ListenerCategory::Backup,
                ListenerCategory::Notification,
            ],
            log_filter: env::DEFAULT_LOG_FILTER.to_string(),
            report_name: env::DEFAULT_REPORT_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    /// Manager settings derived from this config
    pub fn task_manager_config(&self) -> TaskManagerConfig {
        TaskManagerConfig {
            strategy: Some(self.strategy),
            max_concurrency: self.max_concurrency,
        }
    }

    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> EngineResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_toml_string()?).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A loaded configuration and the file it came from, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: EngineConfig,
    /// `None` when built-in defaults were used
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Log where the configuration came from; call once tracing is initialized
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded configuration from: {:?}", path),
            None => info!("No configuration file found, using defaults"),
        }
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load the explicit path if given, otherwise discover one in the current directory
    pub fn load(explicit: Option<&Path>) -> EngineResult<LoadedConfig> {
        let workspace = std_env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(explicit, &workspace)
    }

    /// Load relative to `workspace`; the source is reported later through `LoadedConfig::log_source`
    pub fn load_from(explicit: Option<&Path>, workspace: &Path) -> EngineResult<LoadedConfig> {
        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(workspace),
        };
        let config = match &source {
            Some(path) => EngineConfig::from_toml_file(path)?,
            None => EngineConfig::default(),
        };
        Ok(LoadedConfig { config, source })
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file(workspace: &Path) -> Option<PathBuf> {
        for candidate in Self::config_candidates(workspace) {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Configuration file candidates in priority order
    pub fn config_candidates(workspace: &Path) -> Vec<PathBuf> {
        vec![
            env::root_config_file_path(workspace),
            env::local_config_file_path(workspace),
        ]
    }
}
