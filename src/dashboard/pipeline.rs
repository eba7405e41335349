use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::config::SessionContext;
use crate::dashboard::cache::{QueryState, ResourceKind, Slot, ViewCache};
use crate::dashboard::enrich::{FailureMode, RepoEnricher};
use crate::dashboard::languages::collect_distribution;
use crate::error::{Error, Result};
use crate::github::GitHubClient;
use crate::models::{DashboardView, LanguageDistribution, Repository, Section};

const RECENT_EVENTS: usize = 5;

pub struct DashboardPipeline {
    client: Arc<GitHubClient>,
    ctx: SessionContext,
    limiter: Arc<Semaphore>,
}

impl DashboardPipeline {
    pub fn new(client: Arc<GitHubClient>, ctx: SessionContext, concurrency_limit: usize) -> Self {
        Self {
            client,
            ctx,
            limiter: Arc::new(Semaphore::new(concurrency_limit.max(1))),
        }
    }

    /// Runs every dashboard query and resolves the cache slots as results
    /// land. Independent queries run concurrently; enrichment and the
    /// language rollup only start once the repository list has resolved.
    /// A profile failure fails the whole load; anything else comes back as
    /// a failed section.
    pub async fn load(&self, cache: &ViewCache) -> Result<DashboardView> {
        let login = self.ctx.login();
        tracing::info!("Loading dashboard for: {}", login);

        let profile_gen = cache.profile.begin();
        let followers_gen = cache.followers.begin();
        let following_gen = cache.following.begin();
        let activity_gen = cache.activity.begin();

        let (profile_result, (repositories, languages), followers_result, following_result, activity_result) = tokio::join!(
            self.client.get_user(login),
            self.load_repo_sections(cache),
            self.client.get_followers(login),
            self.client.get_following(login),
            self.client.get_recent_events(login, RECENT_EVENTS),
        );

        let followers = finish(&cache.followers, followers_gen, followers_result);
        let following = finish(&cache.following, following_gen, following_result);
        let activity = finish(&cache.activity, activity_gen, activity_result);

        let profile = match profile_result {
            Ok(profile) => {
                cache
                    .profile
                    .resolve(profile_gen, QueryState::Ready(profile.clone()));
                profile
            }
            Err(err) => {
                tracing::error!("Profile fetch failed: {}", err);
                cache
                    .profile
                    .resolve(profile_gen, QueryState::Failed(err.to_string()));
                return Err(err);
            }
        };

        Ok(DashboardView {
            profile,
            repositories,
            languages,
            followers,
            following,
            activity,
        })
    }

    // Dependent stage: the list fetch gates both the per-repo enrichment
    // and the account-wide rollup, so a list failure fails both sections.
    async fn load_repo_sections(
        &self,
        cache: &ViewCache,
    ) -> (Section<Vec<Repository>>, Section<LanguageDistribution>) {
        let repos_gen = cache.repositories.begin();
        let languages_gen = cache.languages.begin();

        let stubs = match self.client.list_repos(self.ctx.login()).await {
            Ok(stubs) => stubs,
            Err(err) => {
                tracing::warn!("Repository list fetch failed: {}", err);
                let message = err.to_string();
                cache
                    .repositories
                    .resolve(repos_gen, QueryState::Failed(message.clone()));
                cache
                    .languages
                    .resolve(languages_gen, QueryState::Failed(message.clone()));
                return (Section::Failed(message.clone()), Section::Failed(message));
            }
        };

        tracing::info!("Found {} repositories", stubs.len());

        let (enriched, distribution) = tokio::join!(
            self.enrich_all(stubs.clone()),
            collect_distribution(&self.client, &stubs, &self.limiter, FailureMode::Propagate),
        );

        (
            finish(&cache.repositories, repos_gen, enriched),
            finish(&cache.languages, languages_gen, distribution),
        )
    }

    async fn enrich_all(&self, stubs: Vec<Repository>) -> Result<Vec<Repository>> {
        let enricher = RepoEnricher::new(&self.client, FailureMode::DegradeToSentinel);

        let mut tasks = Vec::new();
        for stub in stubs {
            let limiter = self.limiter.clone();
            let enricher = &enricher;
            tasks.push(async move {
                let _permit = limiter.acquire().await.ok();
                enricher.enrich(stub).await
            });
        }

        join_all(tasks).await.into_iter().collect()
    }

    /// Re-runs the pipeline stage for a single key, leaving sibling keys'
    /// cached state alone.
    pub async fn refresh(&self, cache: &ViewCache, kind: ResourceKind) -> Result<()> {
        let login = self.ctx.login();
        cache.invalidate(kind);

        match kind {
            ResourceKind::Profile => {
                let generation = cache.profile.begin();
                store(&cache.profile, generation, self.client.get_user(login).await)
            }
            ResourceKind::Repositories => {
                let generation = cache.repositories.begin();
                let result = match self.client.list_repos(login).await {
                    Ok(stubs) => self.enrich_all(stubs).await,
                    Err(err) => Err(err),
                };
                store(&cache.repositories, generation, result)
            }
            ResourceKind::Languages => {
                // Dependent query: refuses to run until the repository list
                // has resolved.
                let Some(stubs) = cache.repositories.get().data().cloned() else {
                    return Err(Error::Config(
                        "repository list has not resolved yet".to_string(),
                    ));
                };
                let generation = cache.languages.begin();
                let result = collect_distribution(
                    &self.client,
                    &stubs,
                    &self.limiter,
                    FailureMode::Propagate,
                )
                .await;
                store(&cache.languages, generation, result)
            }
            ResourceKind::Followers => {
                let generation = cache.followers.begin();
                store(
                    &cache.followers,
                    generation,
                    self.client.get_followers(login).await,
                )
            }
            ResourceKind::Following => {
                let generation = cache.following.begin();
                store(
                    &cache.following,
                    generation,
                    self.client.get_following(login).await,
                )
            }
            ResourceKind::Activity => {
                let generation = cache.activity.begin();
                store(
                    &cache.activity,
                    generation,
                    self.client.get_recent_events(login, RECENT_EVENTS).await,
                )
            }
        }
    }
}

fn finish<T: Clone>(slot: &Slot<T>, generation: u64, result: Result<T>) -> Section<T> {
    match result {
        Ok(value) => {
            slot.resolve(generation, QueryState::Ready(value.clone()));
            Section::Ready(value)
        }
        Err(err) => {
            tracing::warn!("Dashboard section failed: {}", err);
            let message = err.to_string();
            slot.resolve(generation, QueryState::Failed(message.clone()));
            Section::Failed(message)
        }
    }
}

fn store<T: Clone>(slot: &Slot<T>, generation: u64, result: Result<T>) -> Result<()> {
    match result {
        Ok(value) => {
            slot.resolve(generation, QueryState::Ready(value));
            Ok(())
        }
        Err(err) => {
            slot.resolve(generation, QueryState::Failed(err.to_string()));
            Err(err)
        }
    }
}
