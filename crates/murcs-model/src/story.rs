//! Stories with their acceptance criteria and tasks

use crate::entity::Entity;
use crate::organisation::Organisation;
use crate::people::Person;
use murcs_tracking::{field, FieldDescriptor, Shared, Trackable, UndoRedoManager};
use std::fmt;

/// Readiness of a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoryState {
    /// Not yet refined
    #[default]
    None,
    /// Refined and ready to plan
    Ready,
}

/// Progress of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Not picked up yet
    #[default]
    NotStarted,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        };
        f.write_str(label)
    }
}

/// A condition that must hold for a story to be accepted
#[derive(Debug, Clone, Default)]
pub struct AcceptanceCondition {
    /// What must hold
    pub description: String,
}

impl AcceptanceCondition {
    /// Create new condition
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl Trackable for AcceptanceCondition {
    const KIND: &'static str = "acceptance condition";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![field(
            "description",
            |c: &AcceptanceCondition| c.description.clone(),
            |c, v| c.description = v,
        )]
    }
}

/// A unit of work within a story
#[derive(Debug, Clone, Default)]
pub struct Task {
    /// Unique within its story, compared case-insensitively
    pub name: String,
    /// Free-text description
    pub description: String,
    /// How far the task has progressed
    pub state: TaskState,
    /// Hours
    pub estimate: f32,
}

impl Task {
    /// Create new task
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Trackable for Task {
    const KIND: &'static str = "task";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("name", |t: &Task| t.name.clone(), |t, v| t.name = v),
            field("description", |t: &Task| t.description.clone(), |t, v| t.description = v),
            field("state", |t: &Task| t.state, |t, v| t.state = v),
            field("estimate", |t: &Task| t.estimate, |t, v| t.estimate = v),
        ]
    }
}

/// A user story
#[derive(Debug, Clone, Default)]
pub struct Story {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// Free-text description
    pub description: String,
    /// Person who wrote the story
    pub creator: Option<Shared<Person>>,
    /// Whether the story can be planned
    pub state: StoryState,
    /// Conditions for accepting the story
    pub acceptance_criteria: Vec<Shared<AcceptanceCondition>>,
    /// Work needed to finish the story
    pub tasks: Vec<Shared<Task>>,
}

impl Story {
    /// Create new story
    #[must_use]
    pub fn new(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            ..Self::default()
        }
    }

    /// Sum of task estimates
    #[must_use]
    pub fn estimate(&self) -> f32 {
        self.tasks.iter().map(|t| t.read().estimate).sum()
    }
}

impl Trackable for Story {
    const KIND: &'static str = "story";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |s: &Story| s.short_name.clone(), |s, v| s.short_name = v),
            field("description", |s: &Story| s.description.clone(), |s, v| s.description = v),
            field("creator", |s: &Story| s.creator.clone(), |s, v| s.creator = v),
            field("state", |s: &Story| s.state, |s, v| s.state = v),
            field(
                "acceptance_criteria",
                |s: &Story| s.acceptance_criteria.clone(),
                |s, v| s.acceptance_criteria = v,
            ),
            field("tasks", |s: &Story| s.tasks.clone(), |s, v| s.tasks = v),
        ]
    }
}

impl Entity for Story {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.stories
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.stories
    }

    fn track_children(&self, history: &mut UndoRedoManager) {
        for condition in &self.acceptance_criteria {
            history.add(condition);
        }
        for task in &self.tasks {
            history.add(task);
        }
    }

    fn untrack_children(&self, history: &mut UndoRedoManager) {
        for condition in &self.acceptance_criteria {
            history.remove(condition);
        }
        for task in &self.tasks {
            history.remove(task);
        }
    }
}
