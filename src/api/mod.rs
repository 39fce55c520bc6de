//! HTTP client for OpenAI-compatible chat completion APIs.
//!
//! - `completions`: the `/chat/completions` request helper
//! - `client`: retrying dispatch and transport wiring

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::SystemTime;

mod client;
mod completions;

pub use client::{ApiClient, RetryPolicy};

/// Minimal model API interface used by the agent loop and model-backed tools.
///
/// Tests provide deterministic mock responses through this trait while the
/// production path uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
}

/// Seconds to wait according to a `Retry-After` header.
///
/// Accepts both delta-seconds and HTTP-date forms; dates in the past yield 0.
pub(crate) fn parse_retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds);
    }
    let at = httpdate::parse_http_date(value).ok()?;
    Some(
        at.duration_since(SystemTime::now())
            .map(|d| d.as_secs())
            .unwrap_or(0),
    )
}
