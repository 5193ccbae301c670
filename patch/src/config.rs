//! Merge configuration.

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable escalating warnings to errors.
pub const WARNINGS_AS_ERRORS_VAR: &str = "CARRY_PATCH_WARNINGS_AS_ERRORS";
/// Environment variable forcing a changed result.
pub const FORCE_CHANGED_VAR: &str = "CARRY_PATCH_FORCE_CHANGED";

/// Flags controlling how merge results are classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeConfig {
    /// Report every warning as an error
    pub treat_warnings_as_errors: bool,
    /// Report `Changed` for any successful merge, even when nothing differed.
    /// Used by callers that persist unconditionally.
    pub force_changed: bool,
}

impl MergeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings_as_errors(mut self, enabled: bool) -> Self {
        self.treat_warnings_as_errors = enabled;
        self
    }

    pub fn force_changed(mut self, enabled: bool) -> Self {
        self.force_changed = enabled;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &'static str| -> Result<bool, ConfigError> {
            match lookup(name) {
                None => Ok(false),
                Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag { name, value }),
            }
        };

        Ok(Self {
            treat_warnings_as_errors: flag(WARNINGS_AS_ERRORS_VAR)?,
            force_changed: flag(FORCE_CHANGED_VAR)?,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" || value.is_empty() {
        Some(false)
    } else {
        None
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: expected true/false/1/0")]
    InvalidFlag { name: &'static str, value: String },
}
