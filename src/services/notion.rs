//! Notion database as the alert record source

use crate::config::NotionSettings;
use crate::error::FetchError;
use crate::models::RawRecord;
use crate::services::join_segments;
use crate::services::record_source::RecordSource;
use serde::Deserialize;
use tracing::{debug, warn};

const SERVICE: &str = "notion";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<RawRecord>,
    #[serde(default)]
    has_more: bool,
}

pub struct NotionRecordSource {
    client: reqwest::Client,
    settings: NotionSettings,
}

impl NotionRecordSource {
    pub fn new(client: reqwest::Client, settings: NotionSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait::async_trait]
impl RecordSource for NotionRecordSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRecord>, FetchError> {
        let url = join_segments(
            &self.settings.api_url,
            &["v1", "databases", &self.settings.database_id, "query"],
        )
        .map_err(|source| FetchError::Url {
            service: SERVICE,
            source,
        })?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.settings.token)
            .header("Notion-Version", &self.settings.api_version)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let payload: QueryResponse = response.json().await.map_err(|e| FetchError::Decode {
            service: SERVICE,
            reason: e.to_string(),
        })?;

        // Only the first page is read.
        if payload.has_more {
            warn!(
                returned = payload.results.len(),
                "Notion reports more rows than one page; only the first page is evaluated"
            );
        }

        debug!(rows = payload.results.len(), "Fetched {} rows from Notion", payload.results.len());
        Ok(payload.results)
    }
}
