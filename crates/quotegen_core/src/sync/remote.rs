//! Remote quote source contract and HTTP implementation.

use crate::config::SyncSettings;
use crate::model::quote::{normalize_category, QuoteRecord};
use crate::sync::{SyncError, SyncResult};
use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Read-only supplier of remote quotes.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_remote(&self) -> SyncResult<Vec<QuoteRecord>>;
}

/// Fetches `title` items from a JSON list endpoint.
#[derive(Clone)]
pub struct HttpRemoteSource {
    client: Client,
    endpoint: String,
    limit: usize,
    category: String,
}

impl HttpRemoteSource {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(settings: &SyncSettings) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            limit: settings.limit,
            category: normalize_category(&settings.category),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self) -> SyncResult<Vec<QuoteRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("_limit", self.limit)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        parse_remote_body(&body, self.limit, &self.category)
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_remote(&self) -> SyncResult<Vec<QuoteRecord>> {
        let started_at = Instant::now();
        info!("event=remote_fetch module=sync status=start limit={}", self.limit);

        let result = self.request().await;

        match &result {
            Ok(records) => info!(
                "event=remote_fetch module=sync status=ok duration_ms={} count={}",
                started_at.elapsed().as_millis(),
                records.len()
            ),
            Err(err) => error!(
                "event=remote_fetch module=sync status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

/// Converts a remote body into at most `limit` records tagged `category`.
///
/// Items whose title is blank are skipped; an item without a string title
/// makes the whole body malformed.
pub fn parse_remote_body(body: &str, limit: usize, category: &str) -> SyncResult<Vec<QuoteRecord>> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| SyncError::MalformedBody(err.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| SyncError::MalformedBody("expected a JSON array".to_string()))?;

    let mut records = Vec::with_capacity(items.len().min(limit));
    for (index, item) in items.iter().take(limit).enumerate() {
        let title = item
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| SyncError::MalformedBody(format!("item {index} has no string title")))?;
        let title = title.trim();
        if title.is_empty() {
            continue;
        }
        records.push(QuoteRecord::new(title, category));
    }
    Ok(records)
}
