pub mod cache;
pub mod enrich;
pub mod languages;
pub mod mutations;
pub mod pipeline;

pub use cache::{QueryState, ResourceKind, Slot, ViewCache};
pub use enrich::{language_shares, FailureMode, RepoEnricher};
pub use languages::collect_distribution;
pub use pipeline::DashboardPipeline;

use std::sync::Arc;

use crate::config::SessionContext;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::DashboardView;

/// Everything one signed-in session needs: the upstream client, the
/// aggregation pipeline and the per-handle view cache, plus the mutation
/// operations defined in `mutations`.
pub struct DashboardService {
    client: Arc<GitHubClient>,
    ctx: SessionContext,
    pipeline: DashboardPipeline,
    cache: ViewCache,
}

impl DashboardService {
    pub fn new(client: GitHubClient, ctx: SessionContext, concurrency_limit: usize) -> Self {
        let client = Arc::new(client);
        let pipeline = DashboardPipeline::new(client.clone(), ctx.clone(), concurrency_limit);
        let cache = ViewCache::new(ctx.login());
        Self {
            client,
            ctx,
            pipeline,
            cache,
        }
    }

    pub async fn load(&self) -> Result<DashboardView> {
        self.pipeline.load(&self.cache).await
    }

    pub async fn refresh(&self, kind: ResourceKind) -> Result<()> {
        self.pipeline.refresh(&self.cache, kind).await
    }

    pub fn cache(&self) -> &ViewCache {
        &self.cache
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }
}
