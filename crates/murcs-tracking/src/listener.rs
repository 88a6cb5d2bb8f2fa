//! Change listeners
//!
//! UI components subscribe to history changes through a
//! [`ListenerRegistry`]. Subscribing hands back a [`ListenerId`] that is
//! used to unsubscribe. A listener can also retire itself by returning
//! `false` from [`ChangeListener::notified`]; it is then pruned during the
//! notification pass that observed it.

use parking_lot::Mutex;
use std::sync::Weak;

/// Kind of history change that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeState {
    /// A new commit was made
    Commit,
    /// History moved backwards
    Revert,
    /// History moved forwards
    Remake,
    /// History was discarded
    Forget,
    /// Older history was squashed
    Assimilate,
}

/// Observer of history changes
pub trait ChangeListener: Send {
    /// Called after each change
    ///
    /// Return `false` once the listener is no longer interested; it will be
    /// dropped from the registry.
    fn notified(&mut self, state: ChangeState) -> bool;
}

impl<F> ChangeListener for F
where
    F: FnMut(ChangeState) -> bool + Send,
{
    fn notified(&mut self, state: ChangeState) -> bool {
        self(state)
    }
}

/// Listener tied to the lifetime of its owner
///
/// Stays registered while the owner's `Arc` is alive and retires itself
/// afterwards, so forms that forget to unsubscribe do not leak. A
/// notification that arrives while the owner's lock is held is skipped.
pub struct WeakListener<L>(Weak<Mutex<L>>);

impl<L> WeakListener<L> {
    /// Follow a listener owned elsewhere
    #[inline]
    #[must_use]
    pub fn new(listener: Weak<Mutex<L>>) -> Self {
        Self(listener)
    }
}

impl<L: ChangeListener> ChangeListener for WeakListener<L> {
    fn notified(&mut self, state: ChangeState) -> bool {
        match self.0.upgrade() {
            Some(listener) => listener
                .try_lock()
                .map_or(true, |mut listener| listener.notified(state)),
            None => false,
        }
    }
}

/// Handle returned by [`ListenerRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Ordered set of listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(ListenerId, Box<dyn ChangeListener>)>,
    next_id: u64,
}

impl ListenerRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe(&mut self, listener: impl ChangeListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener
    ///
    /// Returns `false` if it was not registered (or already pruned).
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Check whether a listener is still registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(existing, _)| *existing == id)
    }

    /// Notify every listener in subscription order, pruning dead ones
    pub fn notify(&mut self, state: ChangeState) {
        self.listeners
            .retain_mut(|(_, listener)| listener.notified(state));
    }

    /// Drop every listener
    #[inline]
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter {
        seen: Vec<ChangeState>,
    }

    impl ChangeListener for Counter {
        fn notified(&mut self, state: ChangeState) -> bool {
            self.seen.push(state);
            true
        }
    }

    #[test]
    fn subscribe_and_notify() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut registry = ListenerRegistry::new();
        registry.subscribe(move |state: ChangeState| {
            sink.lock().push(state);
            true
        });

        registry.notify(ChangeState::Commit);
        registry.notify(ChangeState::Revert);
        assert_eq!(*seen.lock(), vec![ChangeState::Commit, ChangeState::Revert]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let mut registry = ListenerRegistry::new();
        let a = registry.subscribe(|_: ChangeState| true);
        let b = registry.subscribe(|_: ChangeState| true);
        assert_ne!(a, b);

        assert!(registry.unsubscribe(a));
        assert!(!registry.unsubscribe(a));
        assert!(!registry.contains(a));
        assert!(registry.contains(b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn listener_returning_false_is_pruned() {
        let mut calls = 0;
        let mut registry = ListenerRegistry::new();
        let once = registry.subscribe(move |_: ChangeState| {
            calls += 1;
            calls < 2
        });

        registry.notify(ChangeState::Commit);
        assert!(registry.contains(once));
        registry.notify(ChangeState::Commit);
        assert!(!registry.contains(once));
        assert!(registry.is_empty());
    }

    #[test]
    fn weak_listener_dies_with_owner() {
        let owner = Arc::new(Mutex::new(Counter::default()));
        let mut registry = ListenerRegistry::new();
        registry.subscribe(WeakListener::new(Arc::downgrade(&owner)));

        registry.notify(ChangeState::Remake);
        assert_eq!(owner.lock().seen, vec![ChangeState::Remake]);

        drop(owner);
        registry.notify(ChangeState::Forget);
        assert!(registry.is_empty());
    }

    #[test]
    fn weak_listener_skips_while_owner_locked() {
        let owner = Arc::new(Mutex::new(Counter::default()));
        let mut registry = ListenerRegistry::new();
        let id = registry.subscribe(WeakListener::new(Arc::downgrade(&owner)));

        {
            let _busy = owner.lock();
            registry.notify(ChangeState::Commit);
        }
        assert!(registry.contains(id));
        assert!(owner.lock().seen.is_empty());

        registry.notify(ChangeState::Revert);
        assert_eq!(owner.lock().seen, vec![ChangeState::Revert]);
    }
}
