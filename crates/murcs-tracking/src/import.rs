//! Bulk import of a loaded document
//!
//! A freshly loaded document becomes trackable through
//! [`UndoRedoManager::import_model`]: the root aggregate lists its nested
//! objects through [`TrackedAggregate::register`], and one baseline commit
//! is made once everything is registered.

use crate::commit::CommitNumber;
use crate::error::TrackingError;
use crate::field::{Shared, Trackable};
use crate::manager::UndoRedoManager;

/// Message of the baseline commit made by [`UndoRedoManager::import_model`]
pub const IMPORT_MESSAGE: &str = "open project";

/// Root of a document whose nested objects should all be tracked
pub trait TrackedAggregate {
    /// Register every nested trackable object (not the root itself)
    fn register(&self, registrar: &mut Registrar<'_>);
}

/// Collects the objects of an aggregate into a manager
#[derive(Debug)]
pub struct Registrar<'a> {
    manager: &'a mut UndoRedoManager,
    registered: usize,
}

impl<'a> Registrar<'a> {
    fn new(manager: &'a mut UndoRedoManager) -> Self {
        Self {
            manager,
            registered: 0,
        }
    }

    /// Track one object
    pub fn add<T: Trackable>(&mut self, object: &Shared<T>) {
        self.manager.add(object);
        self.registered += 1;
    }

    /// Track every object of a collection
    pub fn add_all<'s, T: Trackable>(&mut self, objects: impl IntoIterator<Item = &'s Shared<T>>) {
        for object in objects {
            self.add(object);
        }
    }

    /// Number of objects registered so far
    #[inline]
    #[must_use]
    pub fn registered(&self) -> usize {
        self.registered
    }
}

impl UndoRedoManager {
    /// Make a freshly loaded document trackable
    ///
    /// Forgets every previously tracked object and all history, registers
    /// `root` and everything it lists, then makes the baseline commit.
    ///
    /// # Errors
    /// Returns error if the baseline commit fails
    pub fn import_model<A>(&mut self, root: &Shared<A>) -> Result<Option<CommitNumber>, TrackingError>
    where
        A: Trackable + TrackedAggregate,
    {
        self.forget(true);
        let registered = {
            let mut registrar = Registrar::new(self);
            registrar.add(root);
            root.read().register(&mut registrar);
            registrar.registered()
        };
        tracing::info!(
            kind = A::KIND,
            objects = registered,
            fields = self.tracked_field_count(),
            "model imported"
        );
        self.commit(IMPORT_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{field, FieldDescriptor};

    struct Leaf {
        value: u32,
    }

    impl Trackable for Leaf {
        const KIND: &'static str = "leaf";

        fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
            vec![field("value", |l: &Leaf| l.value, |l, v| l.value = v)]
        }
    }

    struct Tree {
        leaves: Vec<Shared<Leaf>>,
    }

    impl Trackable for Tree {
        const KIND: &'static str = "tree";

        fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
            vec![field("leaves", |t: &Tree| t.leaves.clone(), |t, v| t.leaves = v)]
        }
    }

    impl TrackedAggregate for Tree {
        fn register(&self, registrar: &mut Registrar<'_>) {
            registrar.add_all(&self.leaves);
        }
    }

    #[test]
    fn import_registers_nested_objects_and_commits_baseline() {
        let leaves = vec![Shared::new(Leaf { value: 1 }), Shared::new(Leaf { value: 2 })];
        let tree = Shared::new(Tree {
            leaves: leaves.clone(),
        });

        let mut history = UndoRedoManager::default();
        let number = history.import_model(&tree).unwrap();

        assert_eq!(number, Some(CommitNumber::new(0)));
        assert_eq!(history.tracked_field_count(), 3);
        assert!(history.is_tracked(&leaves[1]));
        assert_eq!(history.head().unwrap().message(), IMPORT_MESSAGE);
        assert!(!history.can_revert());
    }

    #[test]
    fn import_forgets_previous_model() {
        let stale = Shared::new(Leaf { value: 9 });
        let mut history = UndoRedoManager::default();
        history.add(&stale);
        history.commit("old").unwrap();

        let tree = Shared::new(Tree { leaves: vec![] });
        history.import_model(&tree).unwrap();
        assert!(!history.is_tracked(&stale));
        assert!(history.is_tracked(&tree));
    }
}
