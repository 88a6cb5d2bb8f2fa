//! History commits
//!
//! A [`Commit`] is one point in history: the field values that were current
//! when it was made, plus the objects that joined or left tracking since
//! the previous commit.

use crate::field::FieldKey;
use crate::pair::FieldValuePair;
use crate::reporter::ErrorReporter;
use chrono::{DateTime, Utc};
use std::fmt;

/// Sequence number of a commit
///
/// Strictly increasing within one manager; never reused until the manager
/// is disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CommitNumber(u64);

impl CommitNumber {
    /// Wrap a raw number
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw number
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The following number
    #[inline]
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CommitNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One point in history
///
/// # Invariants
/// - `pairs` holds at most one entry per tracked field
/// - once pushed onto a history stack the commit is not modified again
#[derive(Debug, Clone)]
pub struct Commit {
    number: CommitNumber,
    message: String,
    created_at: DateTime<Utc>,
    pairs: Vec<FieldValuePair>,
    added: Vec<FieldValuePair>,
    removed: Vec<FieldValuePair>,
}

impl Commit {
    /// Create new commit
    #[must_use]
    pub fn new(
        number: CommitNumber,
        message: impl Into<String>,
        pairs: Vec<FieldValuePair>,
        added: Vec<FieldValuePair>,
        removed: Vec<FieldValuePair>,
    ) -> Self {
        Self {
            number,
            message: message.into(),
            created_at: Utc::now(),
            pairs,
            added,
            removed,
        }
    }

    /// Commit number
    #[inline]
    #[must_use]
    pub fn number(&self) -> CommitNumber {
        self.number
    }

    /// Description of the changes
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// When the commit was made
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Field values captured by this commit
    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[FieldValuePair] {
        &self.pairs
    }

    /// Fields of objects that started being tracked with this commit
    #[inline]
    #[must_use]
    pub fn added_fields(&self) -> &[FieldValuePair] {
        &self.added
    }

    /// Fields of objects that stopped being tracked with this commit
    #[inline]
    #[must_use]
    pub fn removed_fields(&self) -> &[FieldValuePair] {
        &self.removed
    }

    /// Check whether a value for `key` was captured
    #[must_use]
    pub fn captures(&self, key: FieldKey) -> bool {
        self.pairs.iter().any(|pair| pair.key() == key)
    }

    /// Record a pre-change value after the fact, so the commit can be
    /// returned to once later changes are made
    pub(crate) fn add_pair(&mut self, pair: FieldValuePair) {
        if !self.captures(pair.key()) {
            self.pairs.push(pair);
        }
    }

    /// Fold another description into this commit's message
    ///
    /// Returns `false` if the message already mentions it.
    pub(crate) fn append_message(&mut self, message: &str) -> bool {
        if self.message.contains(message) {
            return false;
        }
        self.message.push_str(", ");
        self.message.push_str(message);
        true
    }

    /// Fold a newer commit into this one; the newer values win
    ///
    /// Registrations that the newer commit undoes cancel out.
    pub(crate) fn absorb(&mut self, newer: Commit) {
        for pair in newer.pairs {
            match self.pairs.iter_mut().find(|p| p.same_field(&pair)) {
                Some(existing) => *existing = pair,
                None => self.pairs.push(pair),
            }
        }
        for pair in newer.removed {
            let before = self.added.len();
            self.added.retain(|p| !p.same_field(&pair));
            if self.added.len() == before {
                self.removed.push(pair);
            }
        }
        for pair in newer.added {
            let before = self.removed.len();
            self.removed.retain(|p| !p.same_field(&pair));
            if self.removed.len() == before {
                self.added.push(pair);
            }
        }
    }

    /// Write every captured value back into the live objects
    ///
    /// Fields that cannot be written are reported and skipped.
    /// Returns the number of failed writes.
    pub fn apply(&self, reporter: &dyn ErrorReporter) -> usize {
        let mut failures = 0;
        for pair in &self.pairs {
            if let Err(e) = pair.apply() {
                reporter.report(&e, "could not restore a tracked field");
                failures += 1;
            }
        }
        failures
    }
}
