use std::collections::HashMap;

use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{LanguageShare, Repository, UNAVAILABLE};

// Enrichment swallows sub-call failures per field; the account-wide language
// rollup propagates them. Which side of that line a fetch falls on is chosen
// by the caller, not buried at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    DegradeToSentinel,
    Propagate,
}

pub struct RepoEnricher<'a> {
    client: &'a GitHubClient,
    mode: FailureMode,
}

impl<'a> RepoEnricher<'a> {
    pub fn new(client: &'a GitHubClient, mode: FailureMode) -> Self {
        Self { client, mode }
    }

    /// Folds the latest commit and the language histogram into one
    /// repository stub. A repository without a commit-history reference is
    /// returned with sentinels and no network traffic at all.
    pub async fn enrich(&self, mut repo: Repository) -> Result<Repository> {
        let Some(history_url) = repo.commit_history_url() else {
            repo.last_commit = UNAVAILABLE.to_string();
            repo.commit_message = UNAVAILABLE.to_string();
            repo.languages = Vec::new();
            return Ok(repo);
        };

        let (commit, histogram) = tokio::join!(
            self.client.get_latest_commit(&history_url),
            self.client.get_languages(&repo.languages_url),
        );

        match commit {
            Ok(Some(entry)) => {
                repo.last_commit = entry
                    .commit
                    .committer
                    .date
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string();
                repo.commit_message = entry.commit.message;
            }
            Ok(None) => {
                repo.last_commit = UNAVAILABLE.to_string();
                repo.commit_message = UNAVAILABLE.to_string();
            }
            Err(err) if self.mode == FailureMode::DegradeToSentinel => {
                tracing::debug!("Commit lookup failed for {}: {}", repo.name, err);
                repo.last_commit = UNAVAILABLE.to_string();
                repo.commit_message = UNAVAILABLE.to_string();
            }
            Err(err) => return Err(err),
        }

        match histogram {
            Ok(histogram) => repo.languages = language_shares(&histogram),
            Err(err) if self.mode == FailureMode::DegradeToSentinel => {
                tracing::debug!("Language lookup failed for {}: {}", repo.name, err);
                repo.languages = Vec::new();
            }
            Err(err) => return Err(err),
        }

        Ok(repo)
    }
}

/// Byte counts to percentages, largest share first. A histogram whose bytes
/// sum to zero yields no shares at all.
pub fn language_shares(histogram: &HashMap<String, u64>) -> Vec<LanguageShare> {
    let total: u64 = histogram.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut ordered: Vec<_> = histogram.iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    ordered
        .into_iter()
        .map(|(language, bytes)| LanguageShare {
            language: language.clone(),
            percentage: *bytes as f64 / total as f64 * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_sum_to_hundred() {
        let histogram = HashMap::from([("Rust".to_string(), 7000), ("TOML".to_string(), 3000)]);
        let shares = language_shares(&histogram);

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].language, "Rust");
        let total: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_bytes_yields_no_shares() {
        let histogram = HashMap::from([("Rust".to_string(), 0), ("TOML".to_string(), 0)]);
        assert!(language_shares(&histogram).is_empty());
        assert!(language_shares(&HashMap::new()).is_empty());
    }

    #[test]
    fn test_ties_order_by_name() {
        let histogram = HashMap::from([("B".to_string(), 50), ("A".to_string(), 50)]);
        let shares = language_shares(&histogram);
        assert_eq!(shares[0].language, "A");
        assert_eq!(shares[1].language, "B");
    }
}
