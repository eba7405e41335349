use std::collections::HashMap;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{Error, Result, UpstreamBody};
use crate::github::paginator::Paginator;
use crate::github::rate_limit::RateBudget;
use crate::models::{ActivityEvent, CommitEntry, FollowerEntry, Profile, Repository, Viewer};

pub struct GitHubClient {
    client: Client,
    budget: RateBudget,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("gitdash/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            budget: RateBudget::new(),
            base_url: base_url.into(),
        })
    }

    pub async fn get_user(&self, username: &str) -> Result<Profile> {
        self.budget.acquire().await;
        let url = format!("{}/users/{}", self.base_url, username);
        tracing::info!("Fetching profile: {}", username);

        let response = self.client.get(&url).send().await?;
        self.budget.observe(response.headers()).await;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("user {}", username)));
        }

        decode(response).await
    }

    /// Resolves the credential to the identity it belongs to.
    pub async fn get_viewer(&self) -> Result<Viewer> {
        self.budget.acquire().await;
        let url = format!("{}/user", self.base_url);

        let response = self.client.get(&url).send().await?;
        self.budget.observe(response.headers()).await;

        if !response.status().is_success() {
            return Err(Error::Authorization(
                "credential does not resolve to a user".to_string(),
            ));
        }

        decode(response).await
    }

    pub async fn get_repo(&self, owner: &str, name: &str) -> Result<Repository> {
        self.budget.acquire().await;
        let url = format!("{}/repos/{}/{}", self.base_url, owner, name);

        let response = self.client.get(&url).send().await?;
        self.budget.observe(response.headers()).await;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("repository {}/{}", owner, name)));
        }

        decode(response).await
    }

    pub async fn list_repos(&self, username: &str) -> Result<Vec<Repository>> {
        let url = format!("{}/users/{}/repos", self.base_url, username);
        tracing::info!("Fetching repositories for: {}", username);
        Paginator::new(&self.client, &self.budget)
            .fetch_all(&url, 100)
            .await
    }

    pub async fn get_followers(&self, username: &str) -> Result<Vec<FollowerEntry>> {
        let url = format!("{}/users/{}/followers", self.base_url, username);
        Paginator::new(&self.client, &self.budget)
            .fetch_all(&url, 100)
            .await
    }

    pub async fn get_following(&self, username: &str) -> Result<Vec<FollowerEntry>> {
        let url = format!("{}/users/{}/following", self.base_url, username);
        Paginator::new(&self.client, &self.budget)
            .fetch_all(&url, 100)
            .await
    }

    pub async fn get_recent_events(
        &self,
        username: &str,
        count: usize,
    ) -> Result<Vec<ActivityEvent>> {
        let url = format!("{}/users/{}/events", self.base_url, username);
        Paginator::new(&self.client, &self.budget)
            .fetch_limited(&url, count as u32, count)
            .await
    }

    /// Most recent entry of a repository's commit history, if any.
    pub async fn get_latest_commit(&self, commit_history_url: &str) -> Result<Option<CommitEntry>> {
        self.budget.acquire().await;
        let separator = if commit_history_url.contains('?') { '&' } else { '?' };
        let url = format!("{commit_history_url}{separator}per_page=1");

        let response = self.client.get(&url).send().await?;
        self.budget.observe(response.headers()).await;

        let mut entries: Vec<CommitEntry> = decode(response).await?;
        if entries.is_empty() {
            Ok(None)
        } else {
            Ok(Some(entries.remove(0)))
        }
    }

    pub async fn get_languages(&self, languages_url: &str) -> Result<HashMap<String, u64>> {
        self.budget.acquire().await;

        let response = self.client.get(languages_url).send().await?;
        self.budget.observe(response.headers()).await;

        decode(response).await
    }

    pub async fn create_repo(
        &self,
        name: &str,
        description: &str,
        private: bool,
    ) -> Result<Repository> {
        self.budget.acquire().await;
        let url = format!("{}/user/repos", self.base_url);
        tracing::info!("Creating repository: {}", name);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": name, "description": description, "private": private }))
            .send()
            .await?;
        self.budget.observe(response.headers()).await;

        decode(response).await
    }

    /// Deletes a repository; the upstream answers 204 on success.
    pub async fn delete_repo(&self, owner: &str, name: &str) -> Result<()> {
        self.budget.acquire().await;
        let url = format!("{}/repos/{}/{}", self.base_url, owner, name);
        tracing::info!("Deleting repository: {}/{}", owner, name);

        let response = self.client.delete(&url).send().await?;
        self.budget.observe(response.headers()).await;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let status = response.status().as_u16();
        let raw = response.text().await.unwrap_or_default();
        Err(Error::Upstream {
            status,
            body: UpstreamBody::parse(raw),
        })
    }

    pub async fn set_visibility(
        &self,
        owner: &str,
        name: &str,
        private: bool,
    ) -> Result<Repository> {
        self.budget.acquire().await;
        let url = format!("{}/repos/{}/{}", self.base_url, owner, name);
        tracing::info!("Updating visibility of {}/{}", owner, name);

        let response = self
            .client
            .patch(&url)
            .json(&json!({ "private": private }))
            .send()
            .await?;
        self.budget.observe(response.headers()).await;

        decode(response).await
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let raw = response.text().await.unwrap_or_default();
        return Err(Error::Upstream {
            status: status.as_u16(),
            body: UpstreamBody::parse(raw),
        });
    }

    Ok(response.json().await?)
}
