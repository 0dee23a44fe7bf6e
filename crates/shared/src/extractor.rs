use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::{PipelineError, Result};
use crate::html;
use crate::models::{ScrapeResult, SourceDescriptor};

/// Fetches pages and pulls headlines or article text out of them.
///
/// No request timeout is set beyond reqwest's defaults; callers that need
/// bounded latency wrap calls in their own `tokio::time::timeout`.
pub struct HeadlineScraper {
    client: Client,
    delay: Duration,
}

impl HeadlineScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        // Plenty of news sites refuse reqwest's default identifier.
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            delay: config.delay,
        })
    }

    /// Headlines for one source. Never fails: any problem is logged and
    /// reported as no headlines, so one bad source can't sink a batch.
    pub async fn fetch_headlines(&self, source: &SourceDescriptor) -> Vec<String> {
        match self.try_fetch_headlines(source).await {
            Ok(headlines) => {
                info!(source = %source.name, count = headlines.len(), "fetched headlines");
                headlines
            }
            Err(e) => {
                let err = PipelineError::SourceFetch {
                    source_name: source.name.clone(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "skipping source");
                Vec::new()
            }
        }
    }

    async fn try_fetch_headlines(&self, source: &SourceDescriptor) -> Result<Vec<String>> {
        let url = source.validate()?;
        let body = self.fetch_html(url).await?;
        html::extract_headlines(&body, &source.selector)
    }

    /// Scrape every source one at a time, in order.
    ///
    /// Sources are never fetched concurrently: the target sites rate-limit
    /// aggressively. The result has exactly one entry per input source,
    /// including sources that produced nothing.
    pub async fn fetch_headlines_for_all(&self, sources: &[SourceDescriptor]) -> Vec<ScrapeResult> {
        stream::iter(sources.iter().enumerate())
            .then(|(idx, source)| async move {
                if idx > 0 && !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                let headlines = self.fetch_headlines(source).await;
                ScrapeResult::new(source.name.clone(), headlines)
            })
            .collect()
            .await
    }

    /// Main text of a single article. Unlike the headline path, failures are
    /// returned: this backs an explicit user action with no fallback value.
    pub async fn fetch_article_text(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| PipelineError::article(url, e))?;
        let body = self
            .fetch_html(parsed)
            .await
            .map_err(|e| PipelineError::article(url, e))?;

        let text = html::extract_article_text(&body);
        debug!(url, chars = text.chars().count(), "extracted article text");
        Ok(text)
    }

    async fn fetch_html(&self, url: Url) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
