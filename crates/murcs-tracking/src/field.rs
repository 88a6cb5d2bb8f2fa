//! Trackable capability and field descriptors
//!
//! Entities opt into history support by implementing [`Trackable`], which
//! lists the entity's fields as typed `(name, getter, setter)` descriptors.
//! The engine binds those descriptors to a [`Shared`] handle and works with
//! the erased [`TrackedField`] from then on.

use crate::error::{FieldError, TrackingError};
use crate::value::{Snapshot, SnapshotValue};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a tracked entity
///
/// Derived from the address of the entity's shared allocation, so it is
/// stable for as long as any handle to the entity is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Build from a raw value (tests and diagnostics)
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Shared, lockable handle to a tracked entity
///
/// Equality and hashing are by identity: two handles are equal only when
/// they point at the same entity, whatever its content.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wrap a new entity
    #[inline]
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Identity of this entity
    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        ObjectId(Arc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// Lock for reading
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Lock for writing
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Lock for reading without blocking
    #[inline]
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
        self.0.try_read()
    }

    /// Lock for writing without blocking
    #[inline]
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
        self.0.try_write()
    }

    /// Check whether two handles refer to the same entity
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Shared<T> {}

impl<T> Hash for Shared<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

// Identity only: references between entities may form cycles
impl<T> Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({})", self.id())
    }
}

/// Typed field descriptor
///
/// Built from plain function pointers, so non-capturing closures work:
///
/// ```rust
/// use murcs_tracking::Field;
///
/// struct Counter { value: i64 }
///
/// let field = Field::new("value", |c: &Counter| c.value, |c, v| c.value = v);
/// assert_eq!(field.name(), "value");
/// ```
pub struct Field<T, V> {
    name: &'static str,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T, V> Field<T, V> {
    /// Create new descriptor
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Self { name, get, set }
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Object-safe field access used by the engine
pub trait FieldAccess<T>: Send + Sync {
    /// Field name, unique within the owning type
    fn name(&self) -> &'static str;

    /// Read the current value
    fn read(&self, owner: &T) -> Snapshot;

    /// Write a previously captured value back
    ///
    /// # Errors
    /// Returns [`FieldError::TypeMismatch`] if the snapshot holds another type
    fn write(&self, owner: &mut T, value: &Snapshot) -> Result<(), FieldError>;
}

impl<T, V> FieldAccess<T> for Field<T, V>
where
    V: SnapshotValue + Clone,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn read(&self, owner: &T) -> Snapshot {
        Snapshot::new((self.get)(owner))
    }

    fn write(&self, owner: &mut T, value: &Snapshot) -> Result<(), FieldError> {
        let value = value
            .downcast_ref::<V>()
            .ok_or(FieldError::TypeMismatch {
                expected: std::any::type_name::<V>(),
            })?;
        (self.set)(owner, value.clone());
        Ok(())
    }
}

/// Erased field descriptor for entity type `T`
pub type FieldDescriptor<T> = Arc<dyn FieldAccess<T>>;

/// Build an erased descriptor in one step
///
/// Shorthand for `Arc::new(Field::new(name, get, set))` that keeps
/// `tracked_fields` lists free of casts.
#[inline]
#[must_use]
pub fn field<T, V>(name: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> FieldDescriptor<T>
where
    T: 'static,
    V: SnapshotValue + Clone,
{
    Arc::new(Field::new(name, get, set))
}

/// Capability of entities whose fields are recorded in history
///
/// # Example
/// ```rust
/// use murcs_tracking::{field, FieldDescriptor, Trackable};
///
/// struct Skill { name: String }
///
/// impl Trackable for Skill {
///     const KIND: &'static str = "skill";
///
///     fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
///         vec![field("name", |s: &Skill| s.name.clone(), |s, v| s.name = v)]
///     }
/// }
/// ```
pub trait Trackable: Sized + Send + Sync + 'static {
    /// Kind label used in logs and error reports
    const KIND: &'static str;

    /// Descriptors for every field that history should follow
    ///
    /// Field names must be unique within the type.
    fn tracked_fields() -> Vec<FieldDescriptor<Self>>;
}

/// Identifies one tracked field across the registry: owner + field name
pub type FieldKey = (ObjectId, &'static str);

/// A field descriptor bound to its owning entity
pub(crate) trait BoundField: Send + Sync {
    fn kind(&self) -> &'static str;
    fn owner(&self) -> ObjectId;
    fn name(&self) -> &'static str;
    fn read(&self) -> Result<Snapshot, FieldError>;
    fn write(&self, value: &Snapshot) -> Result<(), FieldError>;
}

struct OwnedField<T: Trackable> {
    owner: Shared<T>,
    access: FieldDescriptor<T>,
}

impl<T: Trackable> BoundField for OwnedField<T> {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn owner(&self) -> ObjectId {
        self.owner.id()
    }

    fn name(&self) -> &'static str {
        self.access.name()
    }

    fn read(&self) -> Result<Snapshot, FieldError> {
        let guard = self.owner.try_read().ok_or(FieldError::Locked)?;
        Ok(self.access.read(&guard))
    }

    fn write(&self, value: &Snapshot) -> Result<(), FieldError> {
        let mut guard = self.owner.try_write().ok_or(FieldError::Locked)?;
        self.access.write(&mut guard, value)
    }
}

/// Tracked field: owner identity plus field identity
///
/// Holds a strong handle to the owner. Entities leave the registry through
/// an explicit `remove`, and leave history when the commits mentioning them
/// are evicted or forgotten.
#[derive(Clone)]
pub struct TrackedField(Arc<dyn BoundField>);

impl TrackedField {
    /// Bind a descriptor to an owner
    #[must_use]
    pub fn bind<T: Trackable>(owner: &Shared<T>, access: FieldDescriptor<T>) -> Self {
        Self(Arc::new(OwnedField {
            owner: owner.clone(),
            access,
        }))
    }

    /// Bind every descriptor of an entity
    #[must_use]
    pub fn bind_all<T: Trackable>(owner: &Shared<T>) -> Vec<Self> {
        T::tracked_fields()
            .into_iter()
            .map(|access| Self::bind(owner, access))
            .collect()
    }

    /// Kind label of the owner
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.0.kind()
    }

    /// Owner identity
    #[inline]
    #[must_use]
    pub fn owner(&self) -> ObjectId {
        self.0.owner()
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Registry key
    #[inline]
    #[must_use]
    pub fn key(&self) -> FieldKey {
        (self.owner(), self.name())
    }

    /// Check whether both refer to the same owner and field
    #[inline]
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Read the live value
    ///
    /// # Errors
    /// Returns [`TrackingError::FieldAccess`] if the owner is locked
    pub fn read(&self) -> Result<Snapshot, TrackingError> {
        self.0.read().map_err(|source| self.access_error(source))
    }

    /// Write a value into the live field
    ///
    /// # Errors
    /// Returns [`TrackingError::FieldAccess`] if the owner is locked or the
    /// snapshot has the wrong type
    pub fn write(&self, value: &Snapshot) -> Result<(), TrackingError> {
        self.0.write(value).map_err(|source| self.access_error(source))
    }

    fn access_error(&self, source: FieldError) -> TrackingError {
        TrackingError::FieldAccess {
            kind: self.kind(),
            owner: self.owner(),
            field: self.name(),
            source,
        }
    }
}

impl Debug for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{}", self.kind(), self.owner(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Gauge {
        count: i64,
        label: String,
    }

    impl Trackable for Gauge {
        const KIND: &'static str = "gauge";

        fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
            vec![
                field("count", |p: &Gauge| p.count, |p, v| p.count = v),
                field("label", |p: &Gauge| p.label.clone(), |p, v| p.label = v),
            ]
        }
    }

    fn gauge() -> Shared<Gauge> {
        Shared::new(Gauge {
            count: 1,
            label: "one".into(),
        })
    }

    #[test]
    fn shared_equality_is_identity() {
        let a = gauge();
        let b = gauge();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.id(), a.clone().id());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn bound_field_reads_and_writes() {
        let p = gauge();
        let fields = TrackedField::bind_all(&p);
        assert_eq!(fields.len(), 2);

        let count = &fields[0];
        assert_eq!(count.name(), "count");
        assert_eq!(count.key(), (p.id(), "count"));
        assert_eq!(count.read().unwrap(), Snapshot::new(1_i64));

        count.write(&Snapshot::new(7_i64)).unwrap();
        assert_eq!(p.read().count, 7);
    }

    #[test]
    fn write_with_wrong_type_fails() {
        let p = gauge();
        let label = TrackedField::bind_all(&p).remove(1);
        let err = label.write(&Snapshot::new(3_i64)).unwrap_err();
        assert!(matches!(
            err,
            TrackingError::FieldAccess {
                source: FieldError::TypeMismatch { .. },
                ..
            }
        ));
        assert_eq!(p.read().label, "one");
    }

    #[test]
    fn locked_owner_fails_instead_of_blocking() {
        let p = gauge();
        let count = TrackedField::bind_all(&p).remove(0);
        let _guard = p.write();
        let err = count.read().unwrap_err();
        assert!(matches!(
            err,
            TrackingError::FieldAccess {
                source: FieldError::Locked,
                field: "count",
                ..
            }
        ));
    }

    #[test]
    fn debug_names_kind_and_field() {
        let p = gauge();
        let count = TrackedField::bind_all(&p).remove(0);
        let text = format!("{count:?}");
        assert!(text.starts_with("gauge#"));
        assert!(text.ends_with(".count"));
    }
}
