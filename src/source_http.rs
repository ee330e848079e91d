//! HTTP [`PageSource`] for the remote document API.
//!
//! Endpoints used, relative to `source.api_base`:
//!
//! | Call | Purpose |
//! |------|---------|
//! | `GET /docs/{doc}` | Document name |
//! | `GET /docs/{doc}/pages?limit=N&pageToken=T` | Page listing, followed until no `nextPageToken` |
//! | `POST /docs/{doc}/pages/{page}/export` | Start a markdown export |
//! | `GET /docs/{doc}/pages/{page}/export/{id}` | Poll the export until `complete` or `failed` |
//! | `GET <downloadLink>` | Fetch the exported text |
//!
//! When the environment variable named by `source.token_env` is set, its
//! value is sent as a bearer token. Non-2xx responses are errors; retrying
//! is left to [`fetch`](crate::fetch).

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use std::time::Duration;

use doc_mirror_core::models::Page;

use crate::config::SourceConfig;
use crate::traits::PageSource;

pub struct HttpPageSource {
    client: Client,
    base: Url,
    token: Option<String>,
    page_size: u32,
    export_poll: Duration,
    export_max_polls: u32,
}

#[derive(Debug, Deserialize)]
struct DocResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageListResponse {
    #[serde(default)]
    items: Vec<ApiPage>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPage {
    id: String,
    name: String,
    #[serde(default)]
    parent: Option<ApiRef>,
    #[serde(default)]
    content_type: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    browser_link: String,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportStatus {
    status: String,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<ApiPage> for Page {
    fn from(api: ApiPage) -> Self {
        Page {
            id: api.id,
            name: api.name,
            parent_id: api.parent.map(|p| p.id),
            content_type: api.content_type,
            created_at: api.created_at,
            updated_at: api.updated_at,
            browser_link: api.browser_link,
        }
    }
}

impl HttpPageSource {
    /// Build a source from config, reading the token from the environment.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self::new(config, token)
    }

    pub fn new(config: &SourceConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base = Url::parse(&config.api_base)
            .with_context(|| format!("Invalid source.api_base: {}", config.api_base))?;
        if base.cannot_be_a_base() {
            bail!("source.api_base must be an http(s) URL: {}", config.api_base);
        }

        Ok(Self {
            client,
            base,
            token,
            page_size: config.page_size,
            export_poll: Duration::from_millis(config.export_poll_ms),
            export_max_polls: config.export_max_polls,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("source.api_base cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("document API error {}: {}", status, body);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn document_name(&self, doc_id: &str) -> Result<String> {
        let url = self.endpoint(&["docs", doc_id])?;
        let doc: DocResponse = self.get_json(self.client.get(url)).await?;
        Ok(doc.name)
    }

    async fn list_pages(&self, doc_id: &str) -> Result<Vec<Page>> {
        let url = self.endpoint(&["docs", doc_id, "pages"])?;
        let mut pages = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .query(&[("limit", self.page_size.to_string())]);
            if let Some(t) = &token {
                request = request.query(&[("pageToken", t.as_str())]);
            }

            let batch: PageListResponse = self
                .get_json(request)
                .await
                .with_context(|| format!("Failed to list pages of document {}", doc_id))?;
            pages.extend(batch.items.into_iter().map(Page::from));

            match batch.next_page_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        Ok(pages)
    }

    async fn fetch_content(&self, doc_id: &str, page_id: &str) -> Result<String> {
        let start_url = self.endpoint(&["docs", doc_id, "pages", page_id, "export"])?;
        let export: ExportRequest = self
            .get_json(
                self.client
                    .post(start_url)
                    .json(&serde_json::json!({ "outputFormat": "markdown" })),
            )
            .await?;

        let status_url =
            self.endpoint(&["docs", doc_id, "pages", page_id, "export", &export.id])?;

        for poll in 0..self.export_max_polls {
            if poll > 0 {
                tokio::time::sleep(self.export_poll).await;
            }
            let status: ExportStatus = self.get_json(self.client.get(status_url.clone())).await?;
            match status.status.as_str() {
                "complete" => {
                    let link = status
                        .download_link
                        .ok_or_else(|| anyhow!("export {} complete without a download link", export.id))?;
                    let response = self.client.get(&link).send().await?;
                    if !response.status().is_success() {
                        bail!("export download failed with {}", response.status());
                    }
                    return Ok(response.text().await?);
                }
                "failed" => bail!(
                    "export of page {} failed: {}",
                    page_id,
                    status.error.unwrap_or_else(|| "unknown error".to_string())
                ),
                _ => {}
            }
        }

        bail!(
            "export of page {} not complete after {} polls",
            page_id,
            self.export_max_polls
        )
    }
}
