//! Environment constants and path utilities for taskflow.
//!
//! Centralizes defaults and file names so the CLI, config discovery and
//! task model agree on them.

use std::path::{Path, PathBuf};

/// Estimated duration applied to tasks registered without an explicit one
pub const DEFAULT_TASK_MINUTES: u32 = 30;

/// Hidden application directory name
pub const TASKFLOW_DIR_NAME: &str = ".taskflow";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name at the workspace root
pub const ROOT_CONFIG_FILE_NAME: &str = "taskflow.toml";

/// Log filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "taskflow=info";

/// Report name used when forwarding cycle summaries
pub const DEFAULT_REPORT_NAME: &str = "task_summary";

/// Build the `.taskflow` directory path from a workspace root
pub fn taskflow_dir_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(TASKFLOW_DIR_NAME)
}

/// Build the `./taskflow.toml` path
pub fn root_config_file_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(ROOT_CONFIG_FILE_NAME)
}

/// Build the `./.taskflow/config.toml` path
pub fn local_config_file_path(workspace_root: &Path) -> PathBuf {
    taskflow_dir_path(workspace_root).join(CONFIG_FILE_NAME)
}
