//! Testing utilities for MURCS workspace
//!
//! Shared test helpers, fixtures, and recorders.

#![allow(missing_docs)]

use chrono::NaiveDate;
use murcs_model::{
    AcceptanceCondition, Backlog, Organisation, Person, Project, Release, Skill, Sprint, Story, Task,
    Team,
};
use murcs_tracking::{
    field, ChangeListener, ChangeState, ErrorReporter, FieldDescriptor, Shared, Trackable,
    TrackingError, UndoRedoManager,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Install a test-friendly tracing subscriber (idempotent)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Widget {
    pub count: i64,
    pub label: String,
    pub tags: Vec<String>,
}

impl Trackable for Widget {
    const KIND: &'static str = "widget";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("count", |w: &Widget| w.count, |w, v| w.count = v),
            field("label", |w: &Widget| w.label.clone(), |w, v| w.label = v),
            field("tags", |w: &Widget| w.tags.clone(), |w, v| w.tags = v),
        ]
    }
}

pub fn create_widget(count: i64, label: &str) -> Shared<Widget> {
    Shared::new(Widget {
        count,
        label: label.to_string(),
        tags: Vec::new(),
    })
}

/// Manager with `objects` tracked and a baseline commit made
pub fn setup_tracked_manager(objects: &[Shared<Widget>]) -> UndoRedoManager {
    let mut history = UndoRedoManager::default();
    for object in objects {
        history.add(object);
    }
    history.commit("baseline").unwrap();
    history
}

/// Set a widget's count and commit
pub fn commit_count(history: &mut UndoRedoManager, widget: &Shared<Widget>, count: i64) {
    widget.write().count = count;
    history.commit(&format!("set count {count}")).unwrap();
}

/// Records every change notification
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<ChangeState>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChangeState> {
        self.events.lock().clone()
    }
}

impl ChangeListener for RecordingListener {
    fn notified(&mut self, state: ChangeState) -> bool {
        self.events.lock().push(state);
        true
    }
}

/// Records every reported failure as `(context, error message)`
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &TrackingError, context: &str) {
        self.reports.lock().push((context.to_string(), error.to_string()));
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Small organisation with one of everything
pub fn sample_organisation() -> Organisation {
    let rust = Shared::new(Skill::new("rust"));
    let mut alice = Person::new("alice", "al1");
    alice.skills.push(rust.clone());
    let alice = Shared::new(alice);
    let bob = Shared::new(Person::new("bob", "bo2"));

    let mut core = Team::new("core");
    core.members = vec![alice.clone(), bob.clone()];
    core.product_owner = Some(alice.clone());
    let core = Shared::new(core);

    let project = Shared::new(Project::new("murcs"));
    let mut release = Release::new("1.0", date(2024, 6, 1));
    release.project = Some(project.clone());
    let release = Shared::new(release);

    let mut story = Story::new("login");
    story.creator = Some(bob.clone());
    story
        .acceptance_criteria
        .push(Shared::new(AcceptanceCondition::new("user can log in")));
    story.tasks.push(Shared::new(Task::new("login form")));
    let story = Shared::new(story);

    let mut backlog = Backlog::new("main");
    backlog.product_owner = Some(alice.clone());
    backlog.stories.push(story.clone());
    let backlog = Shared::new(backlog);

    let mut sprint = Sprint::new("sprint 1", date(2024, 5, 1), date(2024, 5, 14));
    sprint.team = Some(core.clone());
    sprint.backlog = Some(backlog.clone());
    sprint.release = Some(release.clone());
    sprint.stories.push(story.clone());

    Organisation {
        people: vec![alice, bob],
        teams: vec![core],
        skills: vec![rust],
        projects: vec![project],
        releases: vec![release],
        stories: vec![story],
        backlogs: vec![backlog],
        sprints: vec![Shared::new(sprint)],
        allocations: Vec::new(),
    }
}
