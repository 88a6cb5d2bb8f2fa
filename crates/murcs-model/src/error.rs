//! Error types for model editing

use murcs_tracking::TrackingError;

/// Main model error type
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// History engine failed
    #[error("tracking error: {0}")]
    Tracking(#[from] TrackingError),

    /// Another entity of the same kind already uses this short name
    #[error("{kind} '{name}' already exists")]
    Duplicate {
        /// Entity kind
        kind: &'static str,
        /// Clashing short name
        name: String,
    },

    /// Entity is not part of the organisation (or parent)
    #[error("{kind} not found")]
    NotFound {
        /// Entity kind
        kind: &'static str,
    },

    /// Work allocation is malformed or overlaps another one
    #[error("invalid allocation: {0}")]
    InvalidAllocation(String),
}

impl ModelError {
    /// Check if error came from the history engine
    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        matches!(self, Self::Tracking(_))
    }
}
