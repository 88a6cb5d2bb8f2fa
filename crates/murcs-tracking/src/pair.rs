//! Field/value pairs
//!
//! A [`FieldValuePair`] remembers what a tracked field held at some point
//! and can tell whether the live field has moved on since.

use crate::error::TrackingError;
use crate::field::{FieldKey, ObjectId, TrackedField};
use crate::value::Snapshot;

/// A tracked field together with a snapshot of its value
#[derive(Debug, Clone)]
pub struct FieldValuePair {
    field: TrackedField,
    value: Snapshot,
}

impl FieldValuePair {
    /// Capture the field's current value
    ///
    /// # Errors
    /// Returns error if the field cannot be read
    pub fn capture(field: TrackedField) -> Result<Self, TrackingError> {
        let value = field.read()?;
        Ok(Self { field, value })
    }

    /// Pair a field with a known value
    #[inline]
    #[must_use]
    pub fn with_value(field: TrackedField, value: Snapshot) -> Self {
        Self { field, value }
    }

    /// The tracked field
    #[inline]
    #[must_use]
    pub fn field(&self) -> &TrackedField {
        &self.field
    }

    /// The captured value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Snapshot {
        &self.value
    }

    /// Owner identity
    #[inline]
    #[must_use]
    pub fn owner(&self) -> ObjectId {
        self.field.owner()
    }

    /// Registry key
    #[inline]
    #[must_use]
    pub fn key(&self) -> FieldKey {
        self.field.key()
    }

    /// Check whether both pairs track the same owner and field
    #[inline]
    #[must_use]
    pub fn same_field(&self, other: &Self) -> bool {
        self.field.same_as(&other.field)
    }

    /// Compare the live value with the snapshot
    ///
    /// Returns `(before, after)` and advances the snapshot to the live value
    /// when they differ; returns `None` when nothing changed.
    ///
    /// # Errors
    /// Returns error if the field cannot be read; the snapshot is untouched
    pub fn update(&mut self) -> Result<Option<(Self, Self)>, TrackingError> {
        let current = self.field.read()?;
        Ok(self.advance(current))
    }

    /// Move the snapshot to `current`, reporting the change if any
    pub(crate) fn advance(&mut self, current: Snapshot) -> Option<(Self, Self)> {
        if current == self.value {
            return None;
        }
        let before = self.clone();
        self.value = current;
        Some((before, self.clone()))
    }

    /// Overwrite the snapshot without producing a change
    pub(crate) fn rebase(&mut self, value: Snapshot) {
        self.value = value;
    }

    /// Write the snapshot back into the live field
    ///
    /// # Errors
    /// Returns error if the field cannot be written
    pub fn apply(&self) -> Result<(), TrackingError> {
        self.field.write(&self.value)
    }
}
