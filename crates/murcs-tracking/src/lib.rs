//! MURCS change tracking
//!
//! Field-level undo/redo history for in-memory object models.
//!
//! # Core Concepts
//!
//! - [`Trackable`]: capability of entities whose fields history follows
//! - [`Shared<T>`]: identity-bearing handle to a tracked entity
//! - [`FieldValuePair`]: a tracked field plus a snapshot of its value
//! - [`Commit`]: one point in history
//! - [`UndoRedoManager`]: commit / revert / remake / forget / assimilate
//! - [`ListenerRegistry`]: change notifications for UI components
//!
//! # Flow
//!
//! Entities are registered with [`UndoRedoManager::add`] (or all at once
//! with [`UndoRedoManager::import_model`]). After each externally visible
//! mutation the editing layer calls [`UndoRedoManager::commit`], which diffs
//! every tracked field against its last snapshot and records a commit.
//! [`UndoRedoManager::revert`] and [`UndoRedoManager::remake`] write
//! captured values back into the live entities.

#![warn(unreachable_pub)]

mod commit;
mod config;
mod error;
mod field;
mod import;
mod listener;
mod manager;
mod pair;
mod reporter;
mod value;

// Re-exports
pub use commit::{Commit, CommitNumber};
pub use config::HistoryConfig;
pub use error::{ConfigError, FieldError, TrackingError};
pub use field::{
    field, Field, FieldAccess, FieldDescriptor, FieldKey, ObjectId, Shared, Trackable,
    TrackedField,
};
pub use import::{Registrar, TrackedAggregate, IMPORT_MESSAGE};
pub use listener::{ChangeListener, ChangeState, ListenerId, ListenerRegistry, WeakListener};
pub use manager::UndoRedoManager;
pub use pair::FieldValuePair;
pub use reporter::{ErrorReporter, TracingReporter};
pub use value::{Snapshot, SnapshotValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
