//! Undo/redo history manager
//!
//! [`UndoRedoManager`] owns the history of one document: the registry of
//! tracked fields, the head commit, and the revert/remake stacks.
//!
//! # Threading
//! The manager performs no internal locking. It is `Send`, so it can be
//! moved to the thread that owns the UI, but every call must come from that
//! one thread. Work done elsewhere has to be marshalled back before it
//! touches the manager.
//!
//! # Example
//! ```rust
//! use murcs_tracking::{field, FieldDescriptor, HistoryConfig, Shared, Trackable, UndoRedoManager};
//!
//! struct Counter { value: i64 }
//!
//! impl Trackable for Counter {
//!     const KIND: &'static str = "counter";
//!     fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
//!         vec![field("value", |c: &Counter| c.value, |c, v| c.value = v)]
//!     }
//! }
//!
//! # fn main() -> Result<(), murcs_tracking::TrackingError> {
//! let mut history = UndoRedoManager::new(HistoryConfig::default());
//! let counter = Shared::new(Counter { value: 1 });
//! history.add(&counter);
//! history.commit("create counter")?;
//!
//! counter.write().value = 2;
//! history.commit("increment")?;
//!
//! history.revert()?;
//! assert_eq!(counter.read().value, 1);
//! history.remake()?;
//! assert_eq!(counter.read().value, 2);
//! # Ok(())
//! # }
//! ```

use crate::commit::{Commit, CommitNumber};
use crate::config::HistoryConfig;
use crate::error::TrackingError;
use crate::field::{FieldKey, ObjectId, Shared, Trackable, TrackedField};
use crate::listener::{ChangeListener, ChangeState, ListenerId, ListenerRegistry};
use crate::pair::FieldValuePair;
use crate::reporter::{ErrorReporter, TracingReporter};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;

/// Tracked fields keyed by owner + field name, in registration order
type FieldMap = IndexMap<FieldKey, FieldValuePair>;

/// History of tracked changes with undo (revert) and redo (remake)
pub struct UndoRedoManager {
    /// Commit representing the current state
    head: Option<Commit>,

    /// Commits that can be reverted to; newest at the back
    revert_stack: VecDeque<Commit>,

    /// Commits that can be remade; most recently reverted at the back
    remake_stack: Vec<Commit>,

    /// Live registry of tracked fields with their last committed values
    model_state: FieldMap,

    /// Fields that started being tracked since the last commit
    added_fields: FieldMap,

    /// Fields that stopped being tracked since the last commit
    removed_fields: FieldMap,

    /// Next commit number to hand out
    commit_number: CommitNumber,

    /// Maximum revert stack depth; `None` for unbounded
    maximum_commits: Option<usize>,

    /// When set, tracking, commits, history moves and listeners are no-ops
    disabled: bool,

    listeners: ListenerRegistry,
    reporter: Box<dyn ErrorReporter>,
}

impl UndoRedoManager {
    /// Create a manager with an empty history
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            head: None,
            revert_stack: VecDeque::new(),
            remake_stack: Vec::new(),
            model_state: FieldMap::new(),
            added_fields: FieldMap::new(),
            removed_fields: FieldMap::new(),
            commit_number: CommitNumber::default(),
            maximum_commits: config.maximum_commits,
            disabled: config.disabled,
            listeners: ListenerRegistry::new(),
            reporter: Box::new(TracingReporter),
        }
    }

    /// With a custom error reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Tear the manager down, dropping all history, tracking and listeners
    pub fn dispose(mut self) {
        self.listeners.clear();
        self.forget(true);
        tracing::debug!(next_commit = %self.commit_number, "undo/redo manager disposed");
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Start tracking every field of `object`
    ///
    /// Fields that cannot be read are reported and skipped; the rest are
    /// still registered. Fields already tracked are left as they are.
    /// Re-adding an object removed since the last commit cancels the
    /// removal and keeps its last committed snapshot, so edits made while
    /// it was untracked are still recorded by the next commit.
    pub fn add<T: Trackable>(&mut self, object: &Shared<T>) {
        if self.disabled {
            return;
        }
        for field in TrackedField::bind_all(object) {
            let key = field.key();
            if self.model_state.contains_key(&key) {
                continue;
            }
            if let Some(pair) = self.removed_fields.shift_remove(&key) {
                self.model_state.insert(key, pair);
                continue;
            }
            match FieldValuePair::capture(field) {
                Ok(pair) => {
                    self.model_state.insert(key, pair.clone());
                    self.added_fields.insert(key, pair);
                }
                Err(e) => self.reporter.report(
                    &e,
                    "could not get the field of an object when adding it to undo/redo",
                ),
            }
        }
        tracing::trace!(kind = T::KIND, object = %object.id(), "tracking object");
    }

    /// Stop tracking every field owned by `object`
    pub fn remove<T>(&mut self, object: &Shared<T>) {
        self.remove_object(object.id());
    }

    /// Stop tracking every field owned by the object with identity `owner`
    pub fn remove_object(&mut self, owner: ObjectId) {
        if self.disabled {
            return;
        }
        let keys: Vec<FieldKey> = self
            .model_state
            .keys()
            .filter(|(id, _)| *id == owner)
            .copied()
            .collect();
        for key in keys {
            if let Some(pair) = self.model_state.shift_remove(&key) {
                // removing something added since the last commit cancels out
                if self.added_fields.shift_remove(&key).is_none() {
                    self.removed_fields.insert(key, pair);
                }
            }
        }
        tracing::trace!(object = %owner, "untracking object");
    }

    /// Check whether any field of `object` is tracked
    #[must_use]
    pub fn is_tracked<T>(&self, object: &Shared<T>) -> bool {
        let owner = object.id();
        self.model_state.keys().any(|(id, _)| *id == owner)
    }

    /// Number of tracked fields across all objects
    #[inline]
    #[must_use]
    pub fn tracked_field_count(&self) -> usize {
        self.model_state.len()
    }

    /// Fields added and removed since the last commit
    #[inline]
    #[must_use]
    pub fn pending_registrations(&self) -> (usize, usize) {
        (self.added_fields.len(), self.removed_fields.len())
    }

    // ------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------

    /// Diff every tracked field against its last snapshot
    ///
    /// All fields are read before any snapshot moves, so a failed read
    /// leaves the registry untouched.
    fn find_changes(&mut self) -> Result<(Vec<FieldValuePair>, Vec<FieldValuePair>), TrackingError> {
        let current = self
            .model_state
            .values()
            .map(|pair| pair.field().read())
            .collect::<Result<Vec<_>, _>>()?;

        let mut before = Vec::new();
        let mut after = Vec::new();
        for (pair, value) in self.model_state.values_mut().zip(current) {
            if let Some((old, new)) = pair.advance(value) {
                before.push(old);
                after.push(new);
            }
        }
        Ok((before, after))
    }

    /// Record the current state so it can be returned to later
    ///
    /// Returns the commit number, or `None` when the manager is disabled.
    /// When no field changed and there is history to revert to, no commit is
    /// made: `message` is folded into the head's message and a fresh number
    /// is still consumed. Pending registrations then wait for the next real
    /// commit.
    ///
    /// # Errors
    /// Returns error if a tracked field cannot be read; no commit is made
    /// and no snapshot moves in that case
    pub fn commit(&mut self, message: &str) -> Result<Option<CommitNumber>, TrackingError> {
        if self.disabled {
            return Ok(None);
        }

        let (before, after) = self.find_changes()?;

        if after.is_empty() && self.can_revert() {
            if let Some(head) = self.head.as_mut() {
                head.append_message(message);
            }
            return Ok(Some(self.take_number()));
        }

        let number = self.take_number();

        if let Some(mut previous) = self.head.take() {
            // capture pre-change values now, so the previous head can be restored
            for pair in before {
                previous.add_pair(pair);
            }
            self.revert_stack.push_back(previous);
        }

        let added = std::mem::take(&mut self.added_fields).into_values().collect();
        let removed = std::mem::take(&mut self.removed_fields).into_values().collect();
        let changed = after.len();
        self.head = Some(Commit::new(number, message, after, added, removed));

        self.enforce_limit();
        self.remake_stack.clear();

        tracing::debug!(%number, message, changed, "commit");
        self.notify(ChangeState::Commit);
        Ok(Some(number))
    }

    fn take_number(&mut self) -> CommitNumber {
        let number = self.commit_number;
        self.commit_number = number.next();
        number
    }

    fn enforce_limit(&mut self) {
        if let Some(maximum) = self.maximum_commits {
            while self.revert_stack.len() > maximum {
                self.revert_stack.pop_front();
            }
        }
    }

    // ------------------------------------------------------------------
    // Revert / remake
    // ------------------------------------------------------------------

    /// Revert one step
    ///
    /// # Errors
    /// Returns [`TrackingError::NothingToRevert`] if [`Self::can_revert`] is false
    pub fn revert(&mut self) -> Result<(), TrackingError> {
        if self.disabled {
            return Ok(());
        }
        let target = self
            .revert_stack
            .back()
            .map(Commit::number)
            .ok_or(TrackingError::NothingToRevert)?;
        self.revert_to(target);
        Ok(())
    }

    /// Revert step by step until commit `target` is head, or to the oldest
    /// known commit if `target` is not in the revert history
    ///
    /// Returns the number of steps taken.
    pub fn revert_to(&mut self, target: CommitNumber) -> usize {
        if self.disabled {
            return 0;
        }
        let mut steps = 0;
        while let Some(commit) = self.revert_stack.pop_back() {
            if let Some(leaving) = self.head.take() {
                self.leave(&leaving);
                self.remake_stack.push(leaving);
            }
            self.enter(&commit);
            let reached = commit.number() == target;
            tracing::debug!(number = %commit.number(), message = commit.message(), "revert");
            self.head = Some(commit);
            steps += 1;
            if reached {
                break;
            }
        }
        self.notify(ChangeState::Revert);
        steps
    }

    /// Remake one step
    ///
    /// # Errors
    /// Returns [`TrackingError::NothingToRemake`] if [`Self::can_remake`] is false
    pub fn remake(&mut self) -> Result<(), TrackingError> {
        if self.disabled {
            return Ok(());
        }
        let target = self
            .remake_stack
            .last()
            .map(Commit::number)
            .ok_or(TrackingError::NothingToRemake)?;
        self.remake_to(target);
        Ok(())
    }

    /// Remake step by step until commit `target` is head, or to the newest
    /// known commit if `target` is not in the remake history
    ///
    /// Returns the number of steps taken.
    pub fn remake_to(&mut self, target: CommitNumber) -> usize {
        if self.disabled {
            return 0;
        }
        let mut steps = 0;
        while let Some(commit) = self.remake_stack.pop() {
            if let Some(leaving) = self.head.take() {
                self.revert_stack.push_back(leaving);
            }
            self.enter(&commit);
            let reached = commit.number() == target;
            tracing::debug!(number = %commit.number(), message = commit.message(), "remake");
            self.head = Some(commit);
            steps += 1;
            if reached {
                break;
            }
        }
        self.notify(ChangeState::Remake);
        steps
    }

    /// Undo the registration changes the head introduced, when stepping
    /// back past it
    fn leave(&mut self, leaving: &Commit) {
        for pair in leaving.added_fields() {
            self.model_state.shift_remove(&pair.key());
        }
        for pair in leaving.removed_fields() {
            self.track_pair(pair.clone());
        }
    }

    /// Make `commit` the live state: restore its values and registrations,
    /// then re-base the registry on what is now live
    fn enter(&mut self, commit: &Commit) {
        commit.apply(&*self.reporter);
        for pair in commit.added_fields() {
            self.track_pair(pair.clone());
        }
        for pair in commit.removed_fields() {
            self.model_state.shift_remove(&pair.key());
        }
        self.rebase(commit.pairs().iter().map(FieldValuePair::key));
    }

    /// Put a pair back in the registry with its live value
    fn track_pair(&mut self, mut pair: FieldValuePair) {
        let key = pair.key();
        if self.model_state.contains_key(&key) {
            return;
        }
        match pair.field().read() {
            Ok(value) => pair.rebase(value),
            Err(e) => self
                .reporter
                .report(&e, "could not read a field while restoring it to undo/redo"),
        }
        self.model_state.insert(key, pair);
    }

    /// Refresh registry snapshots from the live fields, so values written by
    /// a revert/remake are not seen as new changes
    fn rebase(&mut self, keys: impl Iterator<Item = FieldKey>) {
        for key in keys {
            if let Some(tracked) = self.model_state.get_mut(&key) {
                match tracked.field().read() {
                    Ok(value) => tracked.rebase(value),
                    Err(e) => self.reporter.report(&e, "could not re-read a restored field"),
                }
            }
        }
    }

    /// Re-apply the head commit's values to the live objects
    ///
    /// Returns the number of fields that could not be written.
    pub fn revert_to_head(&mut self) -> usize {
        if self.disabled {
            return 0;
        }
        let Some(head) = self.head.take() else {
            return 0;
        };
        let failures = head.apply(&*self.reporter);
        self.rebase(head.pairs().iter().map(FieldValuePair::key));
        self.head = Some(head);
        failures
    }

    /// Check if revert (undo) is available
    #[inline]
    #[must_use]
    pub fn can_revert(&self) -> bool {
        !self.revert_stack.is_empty()
    }

    /// Check if remake (redo) is available
    #[inline]
    #[must_use]
    pub fn can_remake(&self) -> bool {
        !self.remake_stack.is_empty()
    }

    /// Message of the change a revert would undo
    #[must_use]
    pub fn revert_message(&self) -> Option<&str> {
        if self.can_revert() {
            self.head.as_ref().map(Commit::message)
        } else {
            None
        }
    }

    /// Message of the change a remake would redo
    #[must_use]
    pub fn remake_message(&self) -> Option<&str> {
        self.remake_stack.last().map(Commit::message)
    }

    /// Commit representing the current state
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&Commit> {
        self.head.as_ref()
    }

    /// Revertible commits, newest first
    pub fn revert_history(&self) -> impl Iterator<Item = &Commit> + '_ {
        self.revert_stack.iter().rev()
    }

    /// Remakeable commits, next-to-remake first
    pub fn remake_history(&self) -> impl Iterator<Item = &Commit> + '_ {
        self.remake_stack.iter().rev()
    }

    /// Depth of the revert stack
    #[inline]
    #[must_use]
    pub fn revert_len(&self) -> usize {
        self.revert_stack.len()
    }

    /// Depth of the remake stack
    #[inline]
    #[must_use]
    pub fn remake_len(&self) -> usize {
        self.remake_stack.len()
    }

    /// Number the next commit will receive
    #[inline]
    #[must_use]
    pub fn next_commit_number(&self) -> CommitNumber {
        self.commit_number
    }

    // ------------------------------------------------------------------
    // History maintenance
    // ------------------------------------------------------------------

    /// Drop all revert and remake history
    ///
    /// With `delete_saved_objects`, also stop tracking everything and clear
    /// the head. Listeners are notified even while the manager is disabled.
    pub fn forget(&mut self, delete_saved_objects: bool) {
        self.revert_stack.clear();
        self.remake_stack.clear();
        if delete_saved_objects {
            self.model_state.clear();
            self.added_fields.clear();
            self.removed_fields.clear();
            self.head = None;
        }
        tracing::info!(delete_saved_objects, "history forgotten");
        self.listeners.notify(ChangeState::Forget);
    }

    /// Squash history down to commit `target`
    ///
    /// Newer revertible commits are discarded without being replayed and
    /// folded into `target`, which becomes the head. If `target` is not in
    /// the revert history, all revert history is discarded and the head is
    /// kept. Irreversible.
    ///
    /// # Errors
    /// Returns [`TrackingError::RemakePending`] if remake is possible
    pub fn assimilate(&mut self, target: CommitNumber) -> Result<(), TrackingError> {
        if self.disabled {
            return Ok(());
        }
        match &self.head {
            None => return Ok(()),
            Some(head) if head.number() == target => return Ok(()),
            Some(_) => {}
        }
        if self.can_remake() {
            return Err(TrackingError::RemakePending);
        }

        let mut squashed = Vec::new();
        while let Some(top) = self.revert_stack.back() {
            if top.number() == target {
                break;
            }
            squashed.extend(self.revert_stack.pop_back());
        }

        if let Some(mut base) = self.revert_stack.pop_back() {
            let newer: Vec<Commit> = squashed.into_iter().rev().chain(self.head.take()).collect();
            // the commit below needs the target's values for fields only newer commits changed
            if let Some(below) = self.revert_stack.back_mut() {
                for pair in base.pairs() {
                    if newer.iter().any(|commit| commit.captures(pair.key())) {
                        below.add_pair(pair.clone());
                    }
                }
            }
            for commit in newer {
                base.absorb(commit);
            }
            self.head = Some(base);
        }

        tracing::info!(%target, remaining = self.revert_stack.len(), "history assimilated");
        self.notify(ChangeState::Assimilate);
        Ok(())
    }

    /// Maximum revert stack depth; `None` for unbounded
    #[inline]
    #[must_use]
    pub fn maximum_commits(&self) -> Option<usize> {
        self.maximum_commits
    }

    /// Change the retention bound; excess history is evicted at once
    pub fn set_maximum_commits(&mut self, maximum: Option<usize>) {
        self.maximum_commits = maximum;
        self.enforce_limit();
    }

    /// Switch the manager off (or back on)
    #[inline]
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Check whether the manager is switched off
    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Subscribe to history changes
    ///
    /// Returns `None` (and registers nothing) while disabled.
    pub fn add_change_listener(
        &mut self,
        listener: impl ChangeListener + 'static,
    ) -> Option<ListenerId> {
        if self.disabled {
            return None;
        }
        Some(self.listeners.subscribe(listener))
    }

    /// Unsubscribe a listener
    ///
    /// Ignored while disabled.
    pub fn remove_change_listener(&mut self, id: ListenerId) -> bool {
        if self.disabled {
            return false;
        }
        self.listeners.unsubscribe(id)
    }

    /// Number of subscribed listeners
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drop every listener
    #[inline]
    pub fn forget_listeners(&mut self) {
        self.listeners.clear();
    }

    fn notify(&mut self, state: ChangeState) {
        if self.disabled {
            return;
        }
        self.listeners.notify(state);
    }
}

impl Default for UndoRedoManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl fmt::Debug for UndoRedoManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRedoManager")
            .field("head", &self.head.as_ref().map(Commit::number))
            .field("revert", &self.revert_stack.len())
            .field("remake", &self.remake_stack.len())
            .field("tracked_fields", &self.model_state.len())
            .field("commit_number", &self.commit_number)
            .field("maximum_commits", &self.maximum_commits)
            .field("disabled", &self.disabled)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{field, FieldDescriptor};

    #[derive(Debug)]
    struct Item {
        x: i32,
        name: String,
    }

    impl Trackable for Item {
        const KIND: &'static str = "item";

        fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
            vec![
                field("x", |i: &Item| i.x, |i, v| i.x = v),
                field("name", |i: &Item| i.name.clone(), |i, v| i.name = v),
            ]
        }
    }

    fn item(x: i32) -> Shared<Item> {
        Shared::new(Item {
            x,
            name: format!("item-{x}"),
        })
    }

    fn n(raw: u64) -> CommitNumber {
        CommitNumber::new(raw)
    }

    #[test]
    fn revert_and_remake_single_field() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c1").unwrap();

        a.write().x = 2;
        history.commit("c2").unwrap();

        history.revert().unwrap();
        assert_eq!(a.read().x, 1);
        history.remake().unwrap();
        assert_eq!(a.read().x, 2);
    }

    #[test]
    fn commit_numbers_increase() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        assert_eq!(history.commit("c0").unwrap(), Some(n(0)));
        a.write().x = 5;
        assert_eq!(history.commit("c1").unwrap(), Some(n(1)));
        assert_eq!(history.next_commit_number(), n(2));
    }

    #[test]
    fn no_change_coalesces_into_head() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 2;
        history.commit("edit").unwrap();

        let number = history.commit("rename").unwrap();
        assert_eq!(number, Some(n(2)));
        assert_eq!(history.revert_len(), 1);
        assert_eq!(history.head().unwrap().message(), "edit, rename");
        assert_eq!(history.head().unwrap().number(), n(1));

        history.commit("edit").unwrap();
        assert_eq!(history.head().unwrap().message(), "edit, rename");
        // numbers are consumed even when coalescing
        assert_eq!(history.next_commit_number(), n(4));
    }

    #[test]
    fn no_change_without_history_still_commits() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        history.commit("c1").unwrap();
        assert_eq!(history.revert_len(), 1);
        assert_eq!(history.head().unwrap().message(), "c1");
    }

    #[test]
    fn retroactive_before_values_allow_revert() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        assert!(history.head().unwrap().pairs().is_empty());

        a.write().name = "renamed".into();
        history.commit("c1").unwrap();

        let old = history.revert_history().next().unwrap();
        assert_eq!(old.number(), n(0));
        assert!(old.captures((a.id(), "name")));
        assert!(!old.captures((a.id(), "x")));
    }

    #[test]
    fn new_commit_clears_remake() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 2;
        history.commit("c1").unwrap();
        history.revert().unwrap();
        assert!(history.can_remake());

        a.write().x = 3;
        history.commit("c2").unwrap();
        assert!(!history.can_remake());
        assert_eq!(history.revert_len(), 1);
    }

    #[test]
    fn no_op_commit_after_revert_keeps_remake() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 2;
        history.commit("c1").unwrap();
        a.write().x = 3;
        history.commit("c2").unwrap();

        history.revert().unwrap();
        history.commit("focus lost").unwrap();
        assert!(history.can_remake());
        assert_eq!(history.remake_message(), Some("c2"));
    }

    #[test]
    fn revert_to_walks_several_steps() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("c0").unwrap();
        for x in 1..=4 {
            a.write().x = x;
            history.commit(&format!("set {x}")).unwrap();
        }

        let steps = history.revert_to(n(1));
        assert_eq!(steps, 3);
        assert_eq!(a.read().x, 1);
        assert_eq!(history.head().unwrap().number(), n(1));
        assert_eq!(history.remake_len(), 3);

        let steps = history.remake_to(n(99));
        assert_eq!(steps, 3);
        assert_eq!(a.read().x, 4);
        assert!(!history.can_remake());
    }

    #[test]
    fn revert_to_unknown_target_goes_to_oldest() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 1;
        history.commit("c1").unwrap();
        a.write().x = 2;
        history.commit("c2").unwrap();

        history.revert_to(n(1000));
        assert_eq!(a.read().x, 0);
        assert!(!history.can_revert());
        assert_eq!(history.head().unwrap().number(), n(0));
    }

    #[test]
    fn revert_with_empty_stack_fails() {
        let mut history = UndoRedoManager::default();
        assert!(matches!(history.revert(), Err(TrackingError::NothingToRevert)));
        assert!(matches!(history.remake(), Err(TrackingError::NothingToRemake)));
    }

    #[test]
    fn maximum_commits_bounds_revert_stack() {
        let mut history = UndoRedoManager::new(HistoryConfig::new().with_maximum_commits(2));
        let a = item(0);
        history.add(&a);
        for x in 1..=4 {
            a.write().x = x;
            history.commit("step").unwrap();
        }
        assert!(history.revert_len() <= 2);

        history.set_maximum_commits(Some(1));
        assert_eq!(history.revert_len(), 1);
        assert_eq!(history.maximum_commits(), Some(1));
    }

    #[test]
    fn add_then_remove_before_commit_cancels() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        let b = item(2);
        history.add(&a);
        history.commit("c0").unwrap();

        history.add(&b);
        history.remove(&b);
        assert_eq!(history.pending_registrations(), (0, 0));

        a.write().x = 9;
        history.commit("c1").unwrap();
        let head = history.head().unwrap();
        assert!(head.added_fields().is_empty());
        assert!(head.removed_fields().is_empty());
        assert!(!history.is_tracked(&b));
    }

    #[test]
    fn add_is_idempotent() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.add(&a);
        assert_eq!(history.tracked_field_count(), 2);
    }

    #[test]
    fn registration_change_alone_coalesces() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 2;
        history.commit("c1").unwrap();

        let b = item(5);
        history.add(&b);
        history.commit("track b").unwrap();
        assert_eq!(history.revert_len(), 1);
        assert_eq!(history.head().unwrap().message(), "c1, track b");
        assert_eq!(history.pending_registrations(), (2, 0));

        // the pending registration rides along with the next real change
        a.write().x = 3;
        history.commit("c2").unwrap();
        assert_eq!(history.head().unwrap().added_fields().len(), 2);
        assert_eq!(history.pending_registrations(), (0, 0));
    }

    #[test]
    fn readding_removed_object_keeps_committed_snapshot() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 2;
        history.commit("c1").unwrap();

        history.remove(&a);
        a.write().x = 50;
        history.add(&a);
        assert_eq!(history.pending_registrations(), (0, 0));

        history.commit("c2").unwrap();
        assert_eq!(history.revert_len(), 2);
        history.revert().unwrap();
        assert_eq!(a.read().x, 2);
    }

    #[test]
    fn revert_untracks_objects_added_later() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 2;
        history.commit("c1").unwrap();

        let b = item(7);
        history.add(&b);
        a.write().x = 5;
        history.commit("add b").unwrap();
        assert!(history.is_tracked(&b));

        history.revert().unwrap();
        assert!(!history.is_tracked(&b));
        history.remake().unwrap();
        assert!(history.is_tracked(&b));
    }

    #[test]
    fn revert_retracks_objects_removed_later() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        let b = item(2);
        history.add(&a);
        history.add(&b);
        history.commit("c0").unwrap();
        a.write().x = 3;
        history.commit("c1").unwrap();

        history.remove(&b);
        a.write().x = 4;
        history.commit("drop b").unwrap();
        assert!(!history.is_tracked(&b));

        history.revert().unwrap();
        assert!(history.is_tracked(&b));
        b.write().x = 40;
        history.commit("edit b").unwrap();
        assert!(history.head().unwrap().captures((b.id(), "x")));
    }

    #[test]
    fn locked_field_aborts_commit() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        let b = item(2);
        history.add(&a);
        history.add(&b);
        history.commit("c0").unwrap();

        a.write().x = 10;
        let guard = b.write();
        let err = history.commit("blocked").unwrap_err();
        assert!(err.is_field_access());
        drop(guard);

        assert_eq!(history.head().unwrap().message(), "c0");
        // the change to `a` was not swallowed by the failed attempt
        history.commit("retry").unwrap();
        assert!(history.head().unwrap().captures((a.id(), "x")));
    }

    #[test]
    fn forget_keeps_tracking_unless_asked() {
        let mut history = UndoRedoManager::default();
        let a = item(1);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 2;
        history.commit("c1").unwrap();

        history.forget(false);
        assert!(!history.can_revert());
        assert!(history.head().is_some());
        assert!(history.is_tracked(&a));

        history.forget(true);
        assert!(history.head().is_none());
        assert_eq!(history.tracked_field_count(), 0);
    }

    #[test]
    fn assimilate_squashes_newer_commits_into_target() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("c0").unwrap();
        for x in 1..=3 {
            a.write().x = x;
            history.commit(&format!("set {x}")).unwrap();
        }
        assert_eq!(history.revert_len(), 3);

        history.assimilate(n(1)).unwrap();
        assert_eq!(history.revert_len(), 1);
        let head = history.head().unwrap();
        assert_eq!(head.number(), n(1));
        assert_eq!(a.read().x, 3);

        // reverting from the squashed head lands on c0
        history.revert().unwrap();
        assert_eq!(a.read().x, 0);
        history.remake().unwrap();
        assert_eq!(a.read().x, 3);
    }

    #[test]
    fn assimilate_keeps_values_for_fields_only_newer_commits_changed() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 1;
        history.commit("c1").unwrap();
        a.write().name = "renamed".into();
        history.commit("c2").unwrap();
        a.write().x = 3;
        history.commit("c3").unwrap();

        history.assimilate(n(1)).unwrap();
        history.revert().unwrap();
        assert_eq!((a.read().x, a.read().name.as_str()), (0, "item-0"));

        history.remake().unwrap();
        assert_eq!((a.read().x, a.read().name.as_str()), (3, "renamed"));
    }

    #[test]
    fn forget_notifies_while_disabled() {
        let mut history = UndoRedoManager::default();
        let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        history
            .add_change_listener(move |state: ChangeState| {
                sink.lock().push(state);
                true
            })
            .unwrap();

        history.set_disabled(true);
        history.commit("ignored").unwrap();
        history.forget(false);
        assert_eq!(*seen.lock(), vec![ChangeState::Forget]);
    }

    #[test]
    fn assimilate_rejected_while_remake_possible() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 1;
        history.commit("c1").unwrap();
        a.write().x = 2;
        history.commit("c2").unwrap();
        history.revert().unwrap();

        assert!(matches!(history.assimilate(n(0)), Err(TrackingError::RemakePending)));
        assert_eq!(history.revert_len(), 1);
    }

    #[test]
    fn assimilate_head_is_noop() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 1;
        history.commit("c1").unwrap();
        history.assimilate(n(1)).unwrap();
        assert_eq!(history.revert_len(), 1);
    }

    #[test]
    fn disabled_manager_does_nothing() {
        let mut history = UndoRedoManager::new(HistoryConfig::new().disabled());
        let a = item(0);
        history.add(&a);
        assert_eq!(history.tracked_field_count(), 0);
        assert_eq!(history.commit("c0").unwrap(), None);
        assert!(history.add_change_listener(|_: ChangeState| true).is_none());
        assert!(history.revert().is_ok());
    }

    #[test]
    fn revert_message_reports_head_when_revertible() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("open").unwrap();
        assert_eq!(history.revert_message(), None);
        a.write().x = 1;
        history.commit("bump").unwrap();
        assert_eq!(history.revert_message(), Some("bump"));
    }

    #[test]
    fn revert_to_head_discards_uncommitted_edits() {
        let mut history = UndoRedoManager::default();
        let a = item(0);
        history.add(&a);
        history.commit("c0").unwrap();
        a.write().x = 1;
        history.commit("c1").unwrap();

        a.write().x = 77;
        assert_eq!(history.revert_to_head(), 0);
        assert_eq!(a.read().x, 1);
    }
}
