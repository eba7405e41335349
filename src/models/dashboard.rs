use std::collections::BTreeMap;

use serde::Serialize;

use super::activity::ActivityEvent;
use super::repo::Repository;
use super::user::{FollowerEntry, Profile};

/// Accumulated byte counts per language across every owned repository.
/// Percentage conversion is left to the presentation layer.
pub type LanguageDistribution = BTreeMap<String, u64>;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Section<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }
}

// The profile is not a Section: without it there is no dashboard to render,
// so a profile failure fails the whole view instead.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub profile: Profile,
    pub repositories: Section<Vec<Repository>>,
    pub languages: Section<LanguageDistribution>,
    pub followers: Section<Vec<FollowerEntry>>,
    pub following: Section<Vec<FollowerEntry>>,
    pub activity: Section<Vec<ActivityEvent>>,
}
