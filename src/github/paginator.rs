use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::client::decode;
use crate::github::rate_limit::RateBudget;

pub struct Paginator<'a> {
    client: &'a Client,
    budget: &'a RateBudget,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a Client, budget: &'a RateBudget) -> Self {
        Self { client, budget }
    }

    /// Walks the Link header until the last page.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        base_url: &str,
        per_page: u32,
    ) -> Result<Vec<T>> {
        self.fetch_pages(base_url, per_page, None).await
    }

    /// Stops as soon as `max_items` have been collected.
    pub async fn fetch_limited<T: DeserializeOwned>(
        &self,
        base_url: &str,
        per_page: u32,
        max_items: usize,
    ) -> Result<Vec<T>> {
        self.fetch_pages(base_url, per_page, Some(max_items)).await
    }

    async fn fetch_pages<T: DeserializeOwned>(
        &self,
        base_url: &str,
        per_page: u32,
        max_items: Option<usize>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            self.budget.acquire().await;

            let separator = if base_url.contains('?') { '&' } else { '?' };
            let url = format!("{base_url}{separator}per_page={per_page}&page={page}");

            tracing::debug!("Fetching page: {}", url);
            let response = self.client.get(&url).send().await?;
            self.budget.observe(response.headers()).await;

            let has_next = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.contains("rel=\"next\""))
                .unwrap_or(false);

            let batch: Vec<T> = decode(response).await?;
            let batch_len = batch.len();
            items.extend(batch);

            if let Some(cap) = max_items {
                if items.len() >= cap {
                    items.truncate(cap);
                    break;
                }
            }

            // A short page means the upstream ran out even if it still sent
            // a Link header.
            if !has_next || batch_len < per_page as usize {
                break;
            }

            page += 1;
        }

        Ok(items)
    }
}
