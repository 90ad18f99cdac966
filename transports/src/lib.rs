//! Transport implementations for websim
//!
//! [`HttpTransport`] implements the core [`Transport`] trait over a plain
//! `reqwest` client: browser-like default headers, per-request user-agent
//! rotation, redirects followed, one timeout for every request.

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use std::time::{Duration, Instant};
use websim_core::{FetchMetrics, Transport, TransportError};

/// Chance that a request goes out with an outdated browser signature, the
/// kind a compromised host tends to carry.
const OUTDATED_AGENT_PROBABILITY: f64 = 0.1;

/// Realistic current browser signatures
const MODERN_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 11.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
];

/// Outdated/suspicious browser signatures
const OUTDATED_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 6.1; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.3; WOW64; rv:52.0) Gecko/20100101 Firefox/52.0",
];

/// HTTP transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        headers.insert("DNT", HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// The configured per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn pick_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        let pool = if rng.gen::<f64>() < OUTDATED_AGENT_PROBABILITY {
            OUTDATED_USER_AGENTS
        } else {
            MODERN_USER_AGENTS
        };
        pool.choose(&mut rng)
            .copied()
            .expect("agent pools are non-empty")
    }

    fn map_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Http(error)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn visit(&self, target: &str) -> Result<FetchMetrics, TransportError> {
        let start = Instant::now();
        let response = self
            .client
            .get(target)
            .header(USER_AGENT, self.pick_user_agent())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        tracing::debug!(url = target, status = status, "visit");
        Ok(FetchMetrics {
            status,
            elapsed: start.elapsed(),
        })
    }

    async fn submit(
        &self,
        target: &str,
        method: &str,
        payload: &str,
    ) -> Result<FetchMetrics, TransportError> {
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(method.to_string()))?;

        let start = Instant::now();
        let response = self
            .client
            .request(method, target)
            .header(USER_AGENT, self.pick_user_agent())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        tracing::debug!(url = target, status = status, "submit");
        Ok(FetchMetrics {
            status,
            elapsed: start.elapsed(),
        })
    }
}
