//! HTTP health checks for deployed endpoints.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub url: String,
    pub status_code: u16,
    pub healthy: bool,
    pub response_ms: u128,
    pub content_length: usize,
    pub checked_at: DateTime<Utc>,
}

/// GET the endpoint and report its status. Transport-level failures
/// (unreachable host, TLS, timeout) surface as `health.request_failed`.
pub fn check(url: &str, timeout: Duration) -> Result<HealthReport> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::internal_unexpected(e.to_string()))?;

    let started = Instant::now();
    let response = client
        .get(url)
        .send()
        .map_err(|e| Error::health_request_failed(url, e.to_string()))?;

    let status_code = response.status().as_u16();
    let healthy = response.status().is_success();
    let body = response
        .text()
        .map_err(|e| Error::health_request_failed(url, e.to_string()))?;

    Ok(HealthReport {
        url: url.to_string(),
        status_code,
        healthy,
        response_ms: started.elapsed().as_millis(),
        content_length: body.len(),
        checked_at: Utc::now(),
    })
}
