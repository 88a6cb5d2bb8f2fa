//! People, skills and teams

use crate::entity::Entity;
use crate::organisation::Organisation;
use murcs_tracking::{field, FieldDescriptor, Shared, Trackable};

/// A skill a person can have
#[derive(Debug, Clone, Default)]
pub struct Skill {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// Display name
    pub long_name: String,
    /// Free-text description
    pub description: String,
}

impl Skill {
    /// Create new skill
    #[must_use]
    pub fn new(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            ..Self::default()
        }
    }
}

impl Trackable for Skill {
    const KIND: &'static str = "skill";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |s: &Skill| s.short_name.clone(), |s, v| s.short_name = v),
            field("long_name", |s: &Skill| s.long_name.clone(), |s, v| s.long_name = v),
            field("description", |s: &Skill| s.description.clone(), |s, v| s.description = v),
        ]
    }
}

impl Entity for Skill {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.skills
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.skills
    }
}

/// A person in the organisation
#[derive(Debug, Clone, Default)]
pub struct Person {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// Full name
    pub long_name: String,
    /// Login of the person
    pub user_id: String,
    /// Skills the person has
    pub skills: Vec<Shared<Skill>>,
}

impl Person {
    /// Create new person
    #[must_use]
    pub fn new(short_name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

impl Trackable for Person {
    const KIND: &'static str = "person";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |p: &Person| p.short_name.clone(), |p, v| p.short_name = v),
            field("long_name", |p: &Person| p.long_name.clone(), |p, v| p.long_name = v),
            field("user_id", |p: &Person| p.user_id.clone(), |p, v| p.user_id = v),
            field("skills", |p: &Person| p.skills.clone(), |p, v| p.skills = v),
        ]
    }
}

impl Entity for Person {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.people
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.people
    }
}

/// A team of people
#[derive(Debug, Clone, Default)]
pub struct Team {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// Display name
    pub long_name: String,
    /// Free-text description
    pub description: String,
    /// People in the team
    pub members: Vec<Shared<Person>>,
    /// Person who owns the team's backlog
    pub product_owner: Option<Shared<Person>>,
    /// Person who runs the team's sprints
    pub scrum_master: Option<Shared<Person>>,
}

impl Team {
    /// Create new team
    #[must_use]
    pub fn new(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            ..Self::default()
        }
    }

    /// Check whether `person` is a member
    #[must_use]
    pub fn has_member(&self, person: &Shared<Person>) -> bool {
        self.members.contains(person)
    }
}

impl Trackable for Team {
    const KIND: &'static str = "team";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |t: &Team| t.short_name.clone(), |t, v| t.short_name = v),
            field("long_name", |t: &Team| t.long_name.clone(), |t, v| t.long_name = v),
            field("description", |t: &Team| t.description.clone(), |t, v| t.description = v),
            field("members", |t: &Team| t.members.clone(), |t, v| t.members = v),
            field("product_owner", |t: &Team| t.product_owner.clone(), |t, v| t.product_owner = v),
            field("scrum_master", |t: &Team| t.scrum_master.clone(), |t, v| t.scrum_master = v),
        ]
    }
}

impl Entity for Team {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.teams
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.teams
    }
}
