//! Utility functions for directory management
//!
//! Follows the XDG Base Directory specification for portable configuration
//! storage across Linux distributions.
//!
//! # Directory Structure
//!
//! - Config: `~/.config/cpaudit/` - User configuration (`config.json`)
//!
//! # Example
//!
//! ```
//! use cpaudit::utils::get_config_dir;
//!
//! if let Some(dir) = get_config_dir() {
//!     let _config_path = dir.join("config.json");
//! }
//! ```

use directories::ProjectDirs;
use std::path::PathBuf;

pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "cpaudit", "cpaudit").map(|pd| pd.config_dir().to_path_buf())
}
