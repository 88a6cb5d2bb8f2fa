//! Editing session over one organisation
//!
//! [`Document`] is the layer UI code talks to. Every mutating operation
//! changes the model and then commits exactly once, so each user-visible
//! action becomes one undoable step.
//!
//! # Example
//!
//! ```
//! use murcs_model::{Document, Organisation, Person};
//! use murcs_tracking::HistoryConfig;
//!
//! let mut doc = Document::open(Organisation::new(), HistoryConfig::default()).unwrap();
//! let alice = doc.create(Person::new("alice", "a1")).unwrap();
//! doc.edit(&alice, "edit person", |p| p.long_name = "Alice Liddell".into()).unwrap();
//!
//! doc.undo().unwrap();
//! assert_eq!(alice.read().long_name, "");
//! doc.redo().unwrap();
//! assert_eq!(alice.read().long_name, "Alice Liddell");
//! ```

use crate::entity::{same_name, Entity};
use crate::error::ModelError;
use crate::organisation::Organisation;
use crate::people::Team;
use crate::project::{Project, WorkAllocation};
use crate::story::{AcceptanceCondition, Story, Task};
use chrono::NaiveDate;
use murcs_tracking::{Commit, CommitNumber, HistoryConfig, Shared, Trackable, UndoRedoManager};
use tracing::{debug, info};

/// Commit message for a new acceptance condition
pub const ADD_CONDITION_MESSAGE: &str = "Added acceptance criteria";

/// Commit message for a removed acceptance condition
pub const REMOVE_CONDITION_MESSAGE: &str = "Removed acceptance criteria";

type Result<T> = std::result::Result<T, ModelError>;

/// An organisation plus its undo/redo history
#[derive(Debug)]
pub struct Document {
    organisation: Shared<Organisation>,
    history: UndoRedoManager,
}

impl Document {
    /// Open a loaded organisation for editing
    ///
    /// # Errors
    /// Returns error if the baseline commit fails
    pub fn open(organisation: Organisation, config: HistoryConfig) -> Result<Self> {
        Self::open_shared(Shared::new(organisation), config)
    }

    /// Open an organisation that is already shared with other code
    ///
    /// # Errors
    /// Returns error if the baseline commit fails
    pub fn open_shared(organisation: Shared<Organisation>, config: HistoryConfig) -> Result<Self> {
        let mut history = UndoRedoManager::new(config);
        history.import_model(&organisation)?;
        info!(organisation = %organisation.id(), "document opened");
        Ok(Self {
            organisation,
            history,
        })
    }

    /// The edited organisation
    #[inline]
    #[must_use]
    pub fn organisation(&self) -> &Shared<Organisation> {
        &self.organisation
    }

    /// The document's history
    #[inline]
    #[must_use]
    pub fn history(&self) -> &UndoRedoManager {
        &self.history
    }

    /// Mutable access to the history (listeners, limits, assimilate)
    #[inline]
    pub fn history_mut(&mut self) -> &mut UndoRedoManager {
        &mut self.history
    }

    /// Mutate `target` and commit the change under `message`
    ///
    /// # Errors
    /// Returns error if the commit fails
    pub fn edit<T, R>(&mut self, target: &Shared<T>, message: &str, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Trackable,
    {
        let result = f(&mut *target.write());
        self.history.commit(message)?;
        Ok(result)
    }

    /// Add a new top-level entity
    ///
    /// # Errors
    /// Returns [`ModelError::Duplicate`] if an entity of the same kind
    /// already has this short name (ignoring case)
    pub fn create<T: Entity>(&mut self, entity: T) -> Result<Shared<T>> {
        self.ensure_unique::<T>(entity.short_name(), None)?;
        let entity = Shared::new(entity);

        self.history.add(&entity);
        entity.read().track_children(&mut self.history);
        T::collection_mut(&mut self.organisation.write()).push(entity.clone());

        self.history.commit(&format!("create {}", T::KIND))?;
        debug!(kind = T::KIND, object = %entity.id(), "entity created");
        Ok(entity)
    }

    /// Rename an entity, keeping short names unique
    ///
    /// # Errors
    /// Returns [`ModelError::Duplicate`] if another entity of the same
    /// kind already uses `short_name`
    pub fn rename<T: Entity>(&mut self, entity: &Shared<T>, short_name: &str) -> Result<()> {
        self.ensure_unique::<T>(short_name, Some(entity))?;
        entity.write().set_short_name(short_name.to_owned());
        self.history.commit(&format!("edit {}", T::KIND))?;
        Ok(())
    }

    /// Remove a top-level entity and everything it owns
    ///
    /// # Errors
    /// Returns [`ModelError::NotFound`] if the entity is not in the
    /// organisation
    pub fn delete<T: Entity>(&mut self, entity: &Shared<T>) -> Result<()> {
        let removed = {
            let mut organisation = self.organisation.write();
            let collection = T::collection_mut(&mut organisation);
            let before = collection.len();
            collection.retain(|e| e != entity);
            before != collection.len()
        };
        if !removed {
            return Err(ModelError::NotFound { kind: T::KIND });
        }

        entity.read().untrack_children(&mut self.history);
        self.history.remove(entity);
        self.history.commit(&format!("remove {}", T::KIND))?;
        debug!(kind = T::KIND, object = %entity.id(), "entity removed");
        Ok(())
    }

    /// Append a new acceptance condition to `story`
    ///
    /// # Errors
    /// Returns error if the commit fails
    pub fn add_acceptance_condition(
        &mut self,
        story: &Shared<Story>,
        description: &str,
    ) -> Result<Shared<AcceptanceCondition>> {
        let condition = Shared::new(AcceptanceCondition::new(description));
        self.history.add(&condition);
        story.write().acceptance_criteria.push(condition.clone());
        self.history.commit(ADD_CONDITION_MESSAGE)?;
        Ok(condition)
    }

    /// Remove an acceptance condition from `story`
    ///
    /// # Errors
    /// Returns [`ModelError::NotFound`] if `condition` is not on `story`
    pub fn remove_acceptance_condition(
        &mut self,
        story: &Shared<Story>,
        condition: &Shared<AcceptanceCondition>,
    ) -> Result<()> {
        let removed = {
            let mut story = story.write();
            let before = story.acceptance_criteria.len();
            story.acceptance_criteria.retain(|c| c != condition);
            before != story.acceptance_criteria.len()
        };
        if !removed {
            return Err(ModelError::NotFound {
                kind: AcceptanceCondition::KIND,
            });
        }
        self.history.remove(condition);
        self.history.commit(REMOVE_CONDITION_MESSAGE)?;
        Ok(())
    }

    /// Add a task to `story`
    ///
    /// # Errors
    /// Returns [`ModelError::Duplicate`] if the story already has a task
    /// with this name (ignoring case)
    pub fn add_task(&mut self, story: &Shared<Story>, task: Task) -> Result<Shared<Task>> {
        if story.read().tasks.iter().any(|t| same_name(&t.read().name, &task.name)) {
            return Err(ModelError::Duplicate {
                kind: Task::KIND,
                name: task.name,
            });
        }
        let task = Shared::new(task);
        self.history.add(&task);
        story.write().tasks.push(task.clone());
        self.history.commit("add task")?;
        Ok(task)
    }

    /// Remove a task from `story`
    ///
    /// # Errors
    /// Returns [`ModelError::NotFound`] if `task` is not on `story`
    pub fn remove_task(&mut self, story: &Shared<Story>, task: &Shared<Task>) -> Result<()> {
        let removed = {
            let mut story = story.write();
            let before = story.tasks.len();
            story.tasks.retain(|t| t != task);
            before != story.tasks.len()
        };
        if !removed {
            return Err(ModelError::NotFound { kind: Task::KIND });
        }
        self.history.remove(task);
        self.history.commit("remove task")?;
        Ok(())
    }

    /// Allocate `team` to `project` from `start` until `end`
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidAllocation`] if `end` precedes `start`
    /// or the team is already allocated during the period
    pub fn allocate(
        &mut self,
        project: &Shared<Project>,
        team: &Shared<Team>,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<()> {
        if end.is_some_and(|end| end < start) {
            return Err(ModelError::InvalidAllocation(
                "end date precedes start date".into(),
            ));
        }
        let allocation = WorkAllocation {
            project: project.clone(),
            team: team.clone(),
            start,
            end,
        };
        {
            let mut organisation = self.organisation.write();
            if organisation
                .allocations_of(team)
                .any(|existing| existing.overlaps(&allocation))
            {
                return Err(ModelError::InvalidAllocation(format!(
                    "team '{}' is already allocated during this period",
                    team.read().short_name
                )));
            }
            organisation.allocations.push(allocation);
        }
        self.history.commit("allocate team")?;
        Ok(())
    }

    /// Undo the most recent commit
    ///
    /// # Errors
    /// Returns error if there is nothing to undo
    #[inline]
    pub fn undo(&mut self) -> Result<()> {
        Ok(self.history.revert()?)
    }

    /// Redo the most recently undone commit
    ///
    /// # Errors
    /// Returns error if there is nothing to redo
    #[inline]
    pub fn redo(&mut self) -> Result<()> {
        Ok(self.history.remake()?)
    }

    /// Check whether undo is possible
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_revert()
    }

    /// Check whether redo is possible
    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_remake()
    }

    /// Message of the step [`Document::undo`] would undo
    #[must_use]
    pub fn undo_message(&self) -> Option<&str> {
        self.history.revert_message()
    }

    /// Message of the step [`Document::redo`] would redo
    #[must_use]
    pub fn redo_message(&self) -> Option<&str> {
        self.history.remake_message()
    }

    /// Mark the current state as saved, dropping undo history
    pub fn mark_saved(&mut self) -> Option<CommitNumber> {
        self.history.forget(false);
        self.history.head().map(Commit::number)
    }

    fn ensure_unique<T: Entity>(&self, short_name: &str, except: Option<&Shared<T>>) -> Result<()> {
        let organisation = self.organisation.read();
        let clash = T::collection(&organisation)
            .iter()
            .filter(|e| except.map_or(true, |except| *e != except))
            .any(|e| same_name(e.read().short_name(), short_name));
        if clash {
            return Err(ModelError::Duplicate {
                kind: T::KIND,
                name: short_name.to_owned(),
            });
        }
        Ok(())
    }
}
