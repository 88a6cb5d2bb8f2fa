//! Top-level entities
//!
//! An [`Entity`] is a trackable object that lives in one of the
//! organisation's collections and is identified there by its short name.

use crate::organisation::Organisation;
use murcs_tracking::{Shared, Trackable, UndoRedoManager};

/// Trackable object stored in an [`Organisation`] collection
pub trait Entity: Trackable {
    /// Unique (case-insensitive) name within the collection
    fn short_name(&self) -> &str;

    /// Replace the short name
    fn set_short_name(&mut self, short_name: String);

    /// The organisation collection holding this kind
    fn collection(organisation: &Organisation) -> &[Shared<Self>];

    /// Mutable access to the collection holding this kind
    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>>;

    /// Start tracking objects owned by this entity
    fn track_children(&self, _history: &mut UndoRedoManager) {}

    /// Stop tracking objects owned by this entity
    fn untrack_children(&self, _history: &mut UndoRedoManager) {}
}

/// Case-insensitive short-name comparison
#[inline]
#[must_use]
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
