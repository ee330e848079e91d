//! Retrying content fetch.
//!
//! Wraps [`PageSource::fetch_content`] with a bounded number of attempts
//! and a fixed delay between them. Defaults: 3 attempts, 2000 ms apart.
//! The last error is returned once the budget is spent.

use anyhow::{anyhow, Result};
use std::time::Duration;

use crate::config::FetchConfig;
use crate::traits::PageSource;

/// Attempt budget and backoff for content fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Fetch one page's content, retrying failures per `policy`.
///
/// Success on any attempt returns immediately. Empty content is a success.
pub async fn fetch_with_retry(
    source: &dyn PageSource,
    doc_id: &str,
    page_id: &str,
    policy: RetryPolicy,
) -> Result<String> {
    let mut last_err = None;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            tokio::time::sleep(policy.delay).await;
        }

        match source.fetch_content(doc_id, page_id).await {
            Ok(content) => return Ok(content),
            Err(e) => {
                tracing::warn!(
                    page_id,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "content fetch failed"
                );
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("content fetch for {} made no attempts", page_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use doc_mirror_core::models::Page;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Fails the first `failures` calls, then returns fixed content.
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakySource {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PageSource for FlakySource {
        async fn document_name(&self, _doc_id: &str) -> Result<String> {
            Ok("Doc".to_string())
        }

        async fn list_pages(&self, _doc_id: &str) -> Result<Vec<Page>> {
            Ok(Vec::new())
        }

        async fn fetch_content(&self, _doc_id: &str, _page_id: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                anyhow::bail!("timeout on call {}", n);
            }
            Ok("recovered content".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_backoff() {
        let source = FlakySource::new(2);
        let started = Instant::now();

        let content = fetch_with_retry(&source, "d", "p", RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(content, "recovered content");
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_short_circuits() {
        let source = FlakySource::new(0);
        let started = Instant::now();

        fetch_with_retry(&source, "d", "p", RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_returns_last_error() {
        let source = FlakySource::new(5);

        let err = fetch_with_retry(&source, "d", "p", RetryPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("timeout on call 3"));
    }
}
