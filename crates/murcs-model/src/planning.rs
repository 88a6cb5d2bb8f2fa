//! Backlogs and sprints

use crate::entity::Entity;
use crate::organisation::Organisation;
use crate::people::{Person, Team};
use crate::project::Release;
use crate::story::Story;
use chrono::NaiveDate;
use murcs_tracking::{field, FieldDescriptor, Shared, Trackable};

/// Ordered list of stories owned by a product owner
#[derive(Debug, Clone, Default)]
pub struct Backlog {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// Free-text description
    pub description: String,
    /// Person who prioritises the backlog
    pub product_owner: Option<Shared<Person>>,
    /// Highest priority first
    pub stories: Vec<Shared<Story>>,
}

impl Backlog {
    /// Create new backlog
    #[must_use]
    pub fn new(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            ..Self::default()
        }
    }

    /// Priority of `story` (0 is highest)
    #[must_use]
    pub fn priority_of(&self, story: &Shared<Story>) -> Option<usize> {
        self.stories.iter().position(|s| s == story)
    }
}

impl Trackable for Backlog {
    const KIND: &'static str = "backlog";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |b: &Backlog| b.short_name.clone(), |b, v| b.short_name = v),
            field("description", |b: &Backlog| b.description.clone(), |b, v| b.description = v),
            field("product_owner", |b: &Backlog| b.product_owner.clone(), |b, v| b.product_owner = v),
            field("stories", |b: &Backlog| b.stories.clone(), |b, v| b.stories = v),
        ]
    }
}

impl Entity for Backlog {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.backlogs
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.backlogs
    }
}

/// A time-boxed iteration of one team towards a release
#[derive(Debug, Clone, Default)]
pub struct Sprint {
    /// Unique name, compared case-insensitively
    pub short_name: String,
    /// What the sprint should achieve
    pub goal: String,
    /// Team running the sprint
    pub team: Option<Shared<Team>>,
    /// Backlog the stories come from
    pub backlog: Option<Shared<Backlog>>,
    /// Release the sprint contributes to
    pub release: Option<Shared<Release>>,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Stories committed to
    pub stories: Vec<Shared<Story>>,
}

impl Sprint {
    /// Create new sprint
    #[must_use]
    pub fn new(short_name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            short_name: short_name.into(),
            start_date,
            end_date,
            ..Self::default()
        }
    }
}

impl Trackable for Sprint {
    const KIND: &'static str = "sprint";

    fn tracked_fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            field("short_name", |s: &Sprint| s.short_name.clone(), |s, v| s.short_name = v),
            field("goal", |s: &Sprint| s.goal.clone(), |s, v| s.goal = v),
            field("team", |s: &Sprint| s.team.clone(), |s, v| s.team = v),
            field("backlog", |s: &Sprint| s.backlog.clone(), |s, v| s.backlog = v),
            field("release", |s: &Sprint| s.release.clone(), |s, v| s.release = v),
            field("start_date", |s: &Sprint| s.start_date, |s, v| s.start_date = v),
            field("end_date", |s: &Sprint| s.end_date, |s, v| s.end_date = v),
            field("stories", |s: &Sprint| s.stories.clone(), |s, v| s.stories = v),
        ]
    }
}

impl Entity for Sprint {
    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn set_short_name(&mut self, short_name: String) {
        self.short_name = short_name;
    }

    fn collection(organisation: &Organisation) -> &[Shared<Self>] {
        &organisation.sprints
    }

    fn collection_mut(organisation: &mut Organisation) -> &mut Vec<Shared<Self>> {
        &mut organisation.sprints
    }
}
