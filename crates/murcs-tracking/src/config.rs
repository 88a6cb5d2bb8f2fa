//! History configuration
//!
//! ```toml
//! # keep at most 50 revertible commits; omit for unbounded history
//! maximum_commits = 50
//! disabled = false
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for an [`crate::UndoRedoManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum number of commits that can be reverted to; `None` for unbounded
    pub maximum_commits: Option<usize>,
    /// Start with tracking switched off
    pub disabled: bool,
}

impl HistoryConfig {
    /// Create default configuration (unbounded, enabled)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a retention bound
    #[inline]
    #[must_use]
    pub fn with_maximum_commits(mut self, maximum: usize) -> Self {
        self.maximum_commits = Some(maximum);
        self
    }

    /// Without a retention bound
    #[inline]
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.maximum_commits = None;
        self
    }

    /// With tracking switched off
    #[inline]
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not a valid history config
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded_and_enabled() {
        let config = HistoryConfig::new();
        assert_eq!(config.maximum_commits, None);
        assert!(!config.disabled);
    }

    #[test]
    fn builder_methods() {
        let config = HistoryConfig::new().with_maximum_commits(3).disabled();
        assert_eq!(config.maximum_commits, Some(3));
        assert!(config.disabled);
        assert_eq!(config.unbounded().maximum_commits, None);
    }

    #[test]
    fn parse_toml() {
        let config = HistoryConfig::from_toml_str("maximum_commits = 25\n").unwrap();
        assert_eq!(config, HistoryConfig::new().with_maximum_commits(25));
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(HistoryConfig::from_toml_str("").unwrap(), HistoryConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = HistoryConfig::from_toml_str("max_commits = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = HistoryConfig::load("/nonexistent/murcs-history.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
