//! Error types for the tracking engine
//!
//! Provides error handling for:
//! - Field access failures (locked owner, snapshot type mismatch)
//! - Invalid history operations (empty stacks, assimilate during redo)
//! - Configuration loading

use crate::field::ObjectId;
use std::path::PathBuf;

/// Main tracking error type
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// Reading or writing a tracked field failed
    #[error("field access failed on {kind} {owner}.{field}: {source}")]
    FieldAccess {
        /// Kind of the owning entity
        kind: &'static str,
        /// Identity of the owning entity
        owner: ObjectId,
        /// Name of the field
        field: &'static str,
        /// What went wrong
        #[source]
        source: FieldError,
    },

    /// `revert` called with nothing to revert to
    #[error("nothing to revert")]
    NothingToRevert,

    /// `remake` called with nothing to remake
    #[error("nothing to remake")]
    NothingToRemake,

    /// `assimilate` called while redo history exists
    #[error("cannot assimilate while remake is possible")]
    RemakePending,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TrackingError {
    /// Check if error is a field access failure
    ///
    /// Field access failures degrade tracking for one field only;
    /// everything else reflects a misuse of the history API.
    #[inline]
    #[must_use]
    pub fn is_field_access(&self) -> bool {
        matches!(self, Self::FieldAccess { .. })
    }

    /// Check if error signals a violated history precondition
    #[inline]
    #[must_use]
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            Self::NothingToRevert | Self::NothingToRemake | Self::RemakePending
        )
    }
}

/// Low-level field access errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The owning object is locked elsewhere (usually by the caller)
    #[error("owner is locked")]
    Locked,

    /// Snapshot does not hold the field's value type
    #[error("snapshot type mismatch: expected {expected}")]
    TypeMismatch {
        /// Expected value type
        expected: &'static str,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read config file
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`crate::HistoryConfig`]
    #[error("invalid history config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_operation_classification() {
        assert!(TrackingError::NothingToRevert.is_invalid_operation());
        assert!(TrackingError::NothingToRemake.is_invalid_operation());
        assert!(TrackingError::RemakePending.is_invalid_operation());
        assert!(!TrackingError::NothingToRevert.is_field_access());
    }

    #[test]
    fn field_access_display_names_field() {
        let err = TrackingError::FieldAccess {
            kind: "story",
            owner: ObjectId::from_raw(0x10),
            field: "description",
            source: FieldError::Locked,
        };
        assert!(err.is_field_access());
        let text = err.to_string();
        assert!(text.contains("story"));
        assert!(text.contains("description"));
        assert!(text.contains("locked"));
    }
}
