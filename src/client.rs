//! HTTP client invoker
//!
//! Every call yields a `RequestOutcome`; transport errors, failing statuses
//! and timeouts are classified into the outcome instead of being returned
//! as errors.


use crate::{
    error::{AppError, Result},
    models::{RequestOutcome, RunConfig},
};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use url::Url;

/// Issues one GET per call on behalf of a virtual user
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET and report how it went
    async fn get(&self, vu: u32, url: &Url) -> RequestOutcome;
}

/// reqwest-backed client sharing one connection pool across all VUs
#[derive(Debug, Clone)]
pub struct LoadClient {
    client: Client,
    request_timeout: Duration,
}

impl LoadClient {
    /// Build a client with the run's timeout, user agent and pool sizing
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(crate::defaults::MAX_REDIRECTS))
            .pool_max_idle_per_host(config.vus as usize)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Send the request and read the full body
    async fn fetch(&self, url: &Url) -> std::result::Result<(u16, u64), reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status, body.len() as u64))
    }
}

#[async_trait]
impl HttpClient for LoadClient {
    async fn get(&self, vu: u32, url: &Url) -> RequestOutcome {
        let started = Instant::now();
        let result = timeout(self.request_timeout, self.fetch(url)).await;
        let latency = started.elapsed();

        match result {
            Ok(Ok((status, bytes))) => RequestOutcome::from_response(vu, status, latency, bytes),
            Ok(Err(e)) => classify_error(vu, latency, &e),
            Err(_) => RequestOutcome::timeout(vu, latency),
        }
    }
}

/// Map a transport error to a failed or timed out outcome
fn classify_error(vu: u32, latency: Duration, error: &reqwest::Error) -> RequestOutcome {
    if error.is_timeout() {
        return RequestOutcome::timeout(vu, latency);
    }

    let message = if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Too many redirects: {}", error)
    } else if error.is_body() || error.is_decode() {
        format!("Failed to read response body: {}", error)
    } else {
        format!("Request failed: {}", error)
    };

    RequestOutcome::failed(vu, error.status().map(|s| s.as_u16()), latency, message)
}
