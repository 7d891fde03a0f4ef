use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use tracing::{debug, warn};

use ordercheck_core::config::{HeuristicsConfig, HttpConfig};
use ordercheck_core::CheckError;

use crate::encoding::decode_body;

/// Statuses worth a backoff-and-retry, matching the transport retry policy of
/// the original checker.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub text: String,
    pub body_len: usize,
}

/// HTTP client for the vendor portal: browser-like headers, a cookie session
/// shared across the run, and certificate verification disabled because the
/// portal's TLS is broken. Retries 429/5xx and transport errors with
/// exponential backoff, bounded by the configured attempt count.
pub struct PortalClient {
    inner: reqwest::Client,
    max_attempts: u32,
    backoff_base: Duration,
    request_timeout: u64,
    encodings: Vec<String>,
}

impl PortalClient {
    pub fn new(http: &HttpConfig, heuristics: &HeuristicsConfig) -> Result<Self, CheckError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&http.accept_language)
                .map_err(|e| CheckError::Config(format!("bad accept_language: {}", e)))?,
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );

        let inner = reqwest::Client::builder()
            .user_agent(http.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .danger_accept_invalid_certs(true)
            .connect_timeout(Duration::from_secs(http.connect_timeout_seconds))
            .timeout(Duration::from_secs(http.request_timeout_seconds))
            .build()
            .map_err(|e| CheckError::Network(e.to_string()))?;

        Ok(Self {
            inner,
            max_attempts: http.max_attempts.max(1),
            backoff_base: Duration::from_millis(http.backoff_base_ms),
            request_timeout: http.request_timeout_seconds,
            encodings: heuristics.encodings.clone(),
        })
    }

    pub async fn get(&self, url: &str) -> Result<FetchedPage, CheckError> {
        self.execute(|| self.inner.get(url)).await
    }

    pub async fn post_form(
        &self,
        url: &str,
        data: &[(String, String)],
    ) -> Result<FetchedPage, CheckError> {
        self.execute(|| self.inner.post(url).form(data)).await
    }

    async fn execute<F>(&self, build: F) -> Result<FetchedPage, CheckError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_err: Option<CheckError> = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = backoff_delay(self.backoff_base, attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            let response = match build().send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(attempt, error = %e, "request failed");
                    last_err = Some(if e.is_timeout() {
                        CheckError::Timeout(self.request_timeout)
                    } else {
                        CheckError::Network(e.to_string())
                    });
                    continue;
                }
            };

            let status = response.status().as_u16();
            if RETRY_STATUSES.contains(&status) && attempt < self.max_attempts {
                warn!(attempt, status, "retryable status");
                last_err = Some(CheckError::Network(format!("status {}", status)));
                continue;
            }

            let final_url = response.url().to_string();
            let body = response
                .bytes()
                .await
                .map_err(|e| CheckError::Network(e.to_string()))?;
            let text = decode_body(&body, &self.encodings);

            debug!(status, final_url = %final_url, bytes = body.len(), "fetched");

            return Ok(FetchedPage {
                final_url,
                status,
                text,
                body_len: body.len(),
            });
        }

        Err(last_err.unwrap_or_else(|| CheckError::Network("request never attempted".into())))
    }
}

/// base * 2^(attempt-2): 1s, 2s, 4s, ... The exponent is capped so an
/// oversized max_attempts in the config cannot overflow the multiplier.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt.saturating_sub(2).min(10))
}
