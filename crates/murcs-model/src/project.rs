//! Projects, releases and team allocations

use crate::entity::Entity;
use crate::organisation::Organisation;
use crate::people::Team;
use chrono::NaiveDate;
use murcs_tracking::{field, FieldDescriptor, Shared, Trackable};

/// A project the organisation works on
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// Display name
    pub long_name: String,
    /// Free-text description
    pub description: String,
}

impl Project {
    /// Create new project
    #[must_use]
    pub fn new(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            ..Self::default()
        }
    }
}

impl Trackable for Project {
    const KIND: &'static str = "project";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |p: &Project| p.short_name.clone(), |p, v| p.short_name = v),
            field("long_name", |p: &Project| p.long_name.clone(), |p, v| p.long_name = v),
            field("description", |p: &Project| p.description.clone(), |p, v| p.description = v),
        ]
    }
}

impl Entity for Project {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.projects
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.projects
    }
}

/// A dated release of a project
#[derive(Debug, Clone, Default)]
pub struct Release {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// Free-text description
    pub description: String,
    /// Day the release ships
    pub release_date: NaiveDate,
    /// Project being released
    pub project: Option<Shared<Project>>,
}

impl Release {
    /// Create new release
    #[must_use]
    pub fn new(short_name: impl Into<String>, release_date: NaiveDate) -> Self {
        Self {
            short_name: short_name.into(),
            release_date,
            ..Self::default()
        }
    }
}

impl Trackable for Release {
    const KIND: &'static str = "release";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |r: &Release| r.short_name.clone(), |r, v| r.short_name = v),
            field("description", |r: &Release| r.description.clone(), |r, v| r.description = v),
            field("release_date", |r: &Release| r.release_date, |r, v| r.release_date = v),
            field("project", |r: &Release| r.project.clone(), |r, v| r.project = v),
        ]
    }
}

impl Entity for Release {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.releases
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.releases
    }
}

/// A team working on a project for a period
///
/// Plain value held in the organisation's allocation list; it changes
/// history only through that list.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkAllocation {
    /// Project the team works on
    pub project: Shared<Project>,
    /// Allocated team
    pub team: Shared<Team>,
    /// First day of the allocation
    pub start: NaiveDate,
    /// Open-ended when `None`
    pub end: Option<NaiveDate>,
}

impl WorkAllocation {
    /// Check whether two periods share at least one day
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let ends_before = |a: &Self, b: &Self| a.end.is_some_and(|end| end < b.start);
        !ends_before(self, other) && !ends_before(other, self)
    }
}
