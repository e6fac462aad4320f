use crate::core::classifier::MatchPolicy;
use crate::core::error::{Error, Result};
use crate::core::rules::ACCESS_RULE_MARKER;
use crate::utils::get_config_dir;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Report output format
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text tables
    #[default]
    #[strum(serialize = "text")]
    Text,
    /// A single JSON document
    #[strum(serialize = "json")]
    Json,
}

/// Log verbosity used when no `-v`/`-q` flag is given
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }

    /// Shifts the level by `-v` (positive) or `-q` (negative) steps.
    pub fn adjusted(self, steps: i8) -> Self {
        const ORDER: [LogLevel; 5] = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        let current = ORDER.iter().position(|&l| l == self).unwrap_or(1);
        let shifted = (i16::try_from(current).unwrap_or(1) + i16::from(steps)).clamp(0, 4);
        ORDER[usize::try_from(shifted).unwrap_or(1)]
    }
}

/// Audit configuration; every field falls back to its default when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditConfig {
    /// Name of the rulebase action object meaning "accept"
    #[serde(default = "default_accept_action")]
    pub accept_action_name: String,
    /// Type tag of the wildcard object
    #[serde(default = "default_any_object_type")]
    pub any_object_type: String,
    /// Substring of an ACL record's `type` marking it as an access rule
    #[serde(default = "default_access_rule_marker")]
    pub access_rule_marker: String,
    #[serde(default)]
    pub default_format: OutputFormat,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            accept_action_name: default_accept_action(),
            any_object_type: default_any_object_type(),
            access_rule_marker: default_access_rule_marker(),
            default_format: OutputFormat::default(),
            log_level: LogLevel::default(),
        }
    }
}

fn default_accept_action() -> String {
    MatchPolicy::default().accept_action_name
}

fn default_any_object_type() -> String {
    MatchPolicy::default().any_object_type
}

fn default_access_rule_marker() -> String {
    ACCESS_RULE_MARKER.to_string()
}

impl AuditConfig {
    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            accept_action_name: self.accept_action_name.clone(),
            any_object_type: self.any_object_type.clone(),
        }
    }
}

/// Loads the configuration.
///
/// With an explicit path the file must exist. Otherwise `config.json` in the
/// user config directory is used if present, and the defaults if not.
///
/// # Errors
///
/// Returns [`Error::Config`] when an explicit path is missing, or when the
/// file that was found is malformed.
pub fn load_config(explicit: Option<&Path>) -> Result<AuditConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match get_config_dir() {
            Some(dir) if dir.join("config.json").is_file() => dir.join("config.json"),
            _ => return Ok(AuditConfig::default()),
        },
    };

    let config_error = |message: String| Error::Config {
        path: path.display().to_string(),
        message,
    };
    let json = std::fs::read_to_string(&path).map_err(|e| config_error(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| config_error(e.to_string()))
}
