use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::models::{
    ActivityEvent, DashboardView, FollowerEntry, LanguageDistribution, Profile, Repository,
    Section,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Profile,
    Repositories,
    Languages,
    Followers,
    Following,
    Activity,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Profile => "profile",
            ResourceKind::Repositories => "repositories",
            ResourceKind::Languages => "languages",
            ResourceKind::Followers => "followers",
            ResourceKind::Following => "following",
            ResourceKind::Activity => "activity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

// One slot per {resource kind, handle} key. The generation counter makes a
// resolve from a superseded fetch a no-op: invalidation bumps the
// generation, so only queries started after it may write their result.
// Writes from queries of the same generation overwrite each other in
// completion order.
pub struct Slot<T> {
    inner: Mutex<SlotInner<T>>,
}

struct SlotInner<T> {
    generation: u64,
    state: QueryState<T>,
}

impl<T: Clone> Slot<T> {
    fn new() -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                generation: 0,
                state: QueryState::Idle,
            }),
        }
    }

    /// Marks the slot as loading and returns the generation the caller must
    /// present when resolving.
    pub fn begin(&self) -> u64 {
        let mut inner = self.lock();
        inner.state = QueryState::Loading;
        inner.generation
    }

    /// Applies the outcome unless the slot was invalidated since `begin`.
    pub fn resolve(&self, generation: u64, state: QueryState<T>) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        inner.state = state;
        true
    }

    pub fn invalidate(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = QueryState::Idle;
    }

    pub fn get(&self) -> QueryState<T> {
        self.lock().state.clone()
    }

    /// Edits resolved data in place, e.g. after a confirmed mutation.
    pub fn update<F: FnOnce(&mut T)>(&self, edit: F) -> bool {
        let mut inner = self.lock();
        if let QueryState::Ready(value) = &mut inner.state {
            edit(value);
            return true;
        }
        false
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct ViewCache {
    login: String,
    pub profile: Slot<Profile>,
    pub repositories: Slot<Vec<Repository>>,
    pub languages: Slot<LanguageDistribution>,
    pub followers: Slot<Vec<FollowerEntry>>,
    pub following: Slot<Vec<FollowerEntry>>,
    pub activity: Slot<Vec<ActivityEvent>>,
}

impl ViewCache {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            profile: Slot::new(),
            repositories: Slot::new(),
            languages: Slot::new(),
            followers: Slot::new(),
            following: Slot::new(),
            activity: Slot::new(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    /// Drops one key's entry; sibling keys keep their cached state.
    pub fn invalidate(&self, kind: ResourceKind) {
        match kind {
            ResourceKind::Profile => self.profile.invalidate(),
            ResourceKind::Repositories => self.repositories.invalidate(),
            ResourceKind::Languages => self.languages.invalidate(),
            ResourceKind::Followers => self.followers.invalidate(),
            ResourceKind::Following => self.following.invalidate(),
            ResourceKind::Activity => self.activity.invalidate(),
        }
        tracing::debug!("Invalidated {} cache for {}", kind, self.login);
    }

    /// Snapshot of whatever has resolved so far. `None` while the profile
    /// is missing, matching the pipeline's fatal-profile rule.
    pub fn view(&self) -> Option<DashboardView> {
        let QueryState::Ready(profile) = self.profile.get() else {
            return None;
        };
        Some(DashboardView {
            profile,
            repositories: section_of(self.repositories.get()),
            languages: section_of(self.languages.get()),
            followers: section_of(self.followers.get()),
            following: section_of(self.following.get()),
            activity: section_of(self.activity.get()),
        })
    }
}

fn section_of<T: Clone>(state: QueryState<T>) -> Section<T> {
    match state {
        QueryState::Ready(value) => Section::Ready(value),
        QueryState::Failed(message) => Section::Failed(message),
        QueryState::Idle | QueryState::Loading => Section::Pending,
    }
}
