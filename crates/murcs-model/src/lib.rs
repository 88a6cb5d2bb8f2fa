//! MURCS project model
//!
//! Agile planning entities (people, teams, projects, stories, sprints)
//! edited through a [`Document`], which records every user-visible change
//! in a [`murcs_tracking::UndoRedoManager`].

#![warn(unreachable_pub)]

mod document;
mod entity;
mod error;
mod organisation;
mod people;
mod planning;
mod project;
mod story;

// Re-exports
pub use document::{Document, ADD_CONDITION_MESSAGE, REMOVE_CONDITION_MESSAGE};
pub use entity::{same_name, Entity};
pub use error::ModelError;
pub use organisation::Organisation;
pub use people::{Person, Skill, Team};
pub use planning::{Backlog, Sprint};
pub use project::{Project, Release, WorkAllocation};
pub use story::{AcceptanceCondition, Story, StoryState, Task, TaskState};
