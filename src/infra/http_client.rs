use crate::error::{InsightsError, Result};
use crate::observability::metrics;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// JSON GET client that waits out 429 responses and fails on any other
/// non-success status.
#[derive(Debug, Clone)]
pub struct RetryingHttpClient {
    client: reqwest::Client,
    rate_limit_backoff: Duration,
    max_rate_limit_retries: u32,
}

impl RetryingHttpClient {
    pub fn new(timeout: Duration, rate_limit_backoff: Duration, max_rate_limit_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rate_limit_backoff,
            max_rate_limit_retries,
        })
    }

    /// GET `url` with `query` and decode the body as JSON.
    ///
    /// `endpoint` labels metrics. Error messages carry `url` without the
    /// query so credentials never reach logs.
    pub async fn get_json(&self, endpoint: &'static str, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut retries = 0u32;
        loop {
            let t_request = Instant::now();
            let resp = self.client.get(url).query(query).send().await.map_err(|e| {
                metrics::sources::request_error(endpoint, 0);
                InsightsError::Transport(e.without_url())
            })?;
            metrics::sources::request_duration(endpoint, t_request.elapsed().as_secs_f64());

            let status = resp.status();
            if status.is_success() {
                metrics::sources::request_success(endpoint);
                let body: Value = resp.json().await.map_err(|e| InsightsError::Transport(e.without_url()))?;
                return Ok(body);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > self.max_rate_limit_retries {
                    metrics::sources::request_error(endpoint, status.as_u16());
                    return Err(InsightsError::RateLimited {
                        url: url.to_string(),
                        attempts: retries,
                    });
                }
                metrics::sources::rate_limit_retry(endpoint);
                warn!(
                    "Rate limit exceeded. Retrying after {} ms (attempt {}/{})...",
                    self.rate_limit_backoff.as_millis(),
                    retries,
                    self.max_rate_limit_retries
                );
                tokio::time::sleep(self.rate_limit_backoff).await;
                continue;
            }

            metrics::sources::request_error(endpoint, status.as_u16());
            debug!("{} responded with {}", url, status);
            return Err(InsightsError::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
    }
}
