//! HTTP transport helpers for completion requests.

use crate::error::ApiError;
use std::time::Duration;

/// Build an HTTP client with timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Add configuration hints to status errors that usually mean misconfiguration.
pub(super) fn with_diagnostic_hints(err: ApiError) -> ApiError {
    let ApiError::Status {
        code,
        mut body,
        retry_after_secs,
    } = err
    else {
        return err;
    };

    match code {
        401 | 403 => body.push_str(
            "\nHint: check `api_key` / `api_key_env` in the [api] config section or set NEAT_API_KEY.",
        ),
        404 => body.push_str(
            "\nHint: this endpoint may not serve `/chat/completions`; check `base_url` and `model`.",
        ),
        _ => {}
    }
    ApiError::status(code, body, retry_after_secs)
}
