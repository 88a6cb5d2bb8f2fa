//! Type-erased field snapshots
//!
//! Provides [`Snapshot`], the value captured from a tracked field at a
//! point in time. Snapshots compare by value, so change detection does not
//! need to know the concrete field type.

use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Object-safe view of a snapshot-capable value
///
/// Blanket-implemented for every `Debug + PartialEq + Send + Sync + 'static`
/// type; there is no need to implement it by hand.
pub trait SnapshotValue: Any + Debug + Send + Sync {
    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Value equality across the erased boundary
    ///
    /// Values of different concrete types are never equal.
    fn eq_value(&self, other: &dyn SnapshotValue) -> bool;
}

impl<V> SnapshotValue for V
where
    V: Any + Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_value(&self, other: &dyn SnapshotValue) -> bool {
        other
            .as_any()
            .downcast_ref::<V>()
            .is_some_and(|other| self == other)
    }
}

/// Captured value of one tracked field
///
/// Cheap to clone: the value itself is shared.
#[derive(Clone)]
pub struct Snapshot(Arc<dyn SnapshotValue>);

impl Snapshot {
    /// Wrap a value
    #[inline]
    #[must_use]
    pub fn new<V: SnapshotValue>(value: V) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the value as its concrete type
    #[inline]
    #[must_use]
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.0.as_any().downcast_ref::<V>()
    }

    /// Check the concrete type
    #[inline]
    #[must_use]
    pub fn is<V: Any>(&self) -> bool {
        self.0.as_any().is::<V>()
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_value(&*other.0)
    }
}

impl Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}
