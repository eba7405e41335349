use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::dashboard::enrich::FailureMode;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{LanguageDistribution, Repository};

/// Account-wide rollup: fetches every repository's histogram and sums byte
/// counts per language. Runs as its own fetch pass, independent of the
/// per-repo enrichment.
pub async fn collect_distribution(
    client: &Arc<GitHubClient>,
    repos: &[Repository],
    limiter: &Arc<Semaphore>,
    mode: FailureMode,
) -> Result<LanguageDistribution> {
    let mut fetches = Vec::new();
    for repo in repos {
        let client = client.clone();
        let limiter = limiter.clone();
        let url = repo.languages_url.clone();
        fetches.push(async move {
            let _permit = limiter.acquire().await.ok();
            client.get_languages(&url).await
        });
    }

    let mut distribution = LanguageDistribution::new();
    for result in join_all(fetches).await {
        match result {
            Ok(histogram) => accumulate(&mut distribution, &histogram),
            Err(err) if mode == FailureMode::DegradeToSentinel => {
                tracing::debug!("Skipping histogram after failed fetch: {}", err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(distribution)
}

pub fn accumulate(distribution: &mut LanguageDistribution, histogram: &HashMap<String, u64>) {
    for (language, bytes) in histogram {
        *distribution.entry(language.clone()).or_insert(0) += *bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_sums_across_repos() {
        let mut distribution = LanguageDistribution::new();
        accumulate(
            &mut distribution,
            &HashMap::from([("Rust".to_string(), 7000), ("TOML".to_string(), 300)]),
        );
        accumulate(
            &mut distribution,
            &HashMap::from([("Rust".to_string(), 1000), ("Python".to_string(), 500)]),
        );

        assert_eq!(distribution.get("Rust"), Some(&8000));
        assert_eq!(distribution.get("TOML"), Some(&300));
        assert_eq!(distribution.get("Python"), Some(&500));
    }
}
