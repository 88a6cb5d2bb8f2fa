//! The organisation: root of a loaded document

use crate::people::{Person, Skill, Team};
use crate::planning::{Backlog, Sprint};
use crate::project::{Project, Release, WorkAllocation};
use crate::story::Story;
use murcs_tracking::{field, FieldDescriptor, Registrar, Shared, Trackable, TrackedAggregate};

/// Every top-level entity of a document
#[derive(Debug, Clone, Default)]
pub struct Organisation {
    /// People employed by the organisation
    pub people: Vec<Shared<Person>>,
    /// Teams people are grouped into
    pub teams: Vec<Shared<Team>>,
    /// Skills people can have
    pub skills: Vec<Shared<Skill>>,
    /// Projects being worked on
    pub projects: Vec<Shared<Project>>,
    /// Releases of those projects
    pub releases: Vec<Shared<Release>>,
    /// Every story, planned or not
    pub stories: Vec<Shared<Story>>,
    /// Product backlogs
    pub backlogs: Vec<Shared<Backlog>>,
    /// Sprints, in creation order
    pub sprints: Vec<Shared<Sprint>>,
    /// Team assignments to projects
    pub allocations: Vec<WorkAllocation>,
}

impl Organisation {
    /// Create an empty organisation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocations of `team`, in insertion order
    pub fn allocations_of<'a>(
        &'a self,
        team: &'a Shared<Team>,
    ) -> impl Iterator<Item = &'a WorkAllocation> + 'a {
        self.allocations.iter().filter(move |a| &a.team == team)
    }

    /// Teams `person` is a member of
    #[must_use]
    pub fn teams_of(&self, person: &Shared<Person>) -> Vec<Shared<Team>> {
        self.teams
            .iter()
            .filter(|t| t.read().has_member(person))
            .cloned()
            .collect()
    }
}

impl Trackable for Organisation {
    const KIND: &'static str = "organisation";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("people", |o: &Organisation| o.people.clone(), |o, v| o.people = v),
            field("teams", |o: &Organisation| o.teams.clone(), |o, v| o.teams = v),
            field("skills", |o: &Organisation| o.skills.clone(), |o, v| o.skills = v),
            field("projects", |o: &Organisation| o.projects.clone(), |o, v| o.projects = v),
            field("releases", |o: &Organisation| o.releases.clone(), |o, v| o.releases = v),
            field("stories", |o: &Organisation| o.stories.clone(), |o, v| o.stories = v),
            field("backlogs", |o: &Organisation| o.backlogs.clone(), |o, v| o.backlogs = v),
            field("sprints", |o: &Organisation| o.sprints.clone(), |o, v| o.sprints = v),
            field("allocations", |o: &Organisation| o.allocations.clone(), |o, v| o.allocations = v),
        ]
    }
}

impl TrackedAggregate for Organisation {
    fn register(&self, registrar: &mut Registrar<'_>) {
        registrar.add_all(&self.people);
        registrar.add_all(&self.teams);
        registrar.add_all(&self.skills);
        registrar.add_all(&self.projects);
        registrar.add_all(&self.releases);
        for story in &self.stories {
            registrar.add(story);
            let story = story.read();
            registrar.add_all(&story.acceptance_criteria);
            registrar.add_all(&story.tasks);
        }
        registrar.add_all(&self.backlogs);
        registrar.add_all(&self.sprints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{AcceptanceCondition, Task};
    use murcs_tracking::UndoRedoManager;

    #[test]
    fn import_tracks_nested_story_objects() {
        let condition = Shared::new(AcceptanceCondition::new("works"));
        let task = Shared::new(Task::new("build"));
        let mut story = Story::new("login");
        story.acceptance_criteria.push(condition.clone());
        story.tasks.push(task.clone());

        let mut organisation = Organisation::new();
        organisation.stories.push(Shared::new(story));
        organisation.people.push(Shared::new(Person::new("alice", "a1")));
        let root = Shared::new(organisation);

        let mut history = UndoRedoManager::default();
        history.import_model(&root).unwrap();

        assert!(history.is_tracked(&root));
        assert!(history.is_tracked(&condition));
        assert!(history.is_tracked(&task));
        assert!(!history.can_revert());
    }

    #[test]
    fn teams_of_person() {
        let alice = Shared::new(Person::new("alice", "a1"));
        let mut core = Team::new("core");
        core.members.push(alice.clone());
        let core = Shared::new(core);

        let mut organisation = Organisation::new();
        organisation.teams = vec![core.clone(), Shared::new(Team::new("ops"))];

        assert_eq!(organisation.teams_of(&alice), vec![core]);
    }
}
