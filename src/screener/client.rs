// src/screener/client.rs
use crate::utils::error::FetchError;
use reqwest::{header, StatusCode};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) screener_extractor/0.1";
// Small pause before every request, on top of the batch pauses
const REQUEST_DELAY_MS: u64 = 250;
// Wait before the single retry after a 429
const RATE_LIMIT_RETRY_DELAY_MS: u64 = 4000;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Creates a reqwest client configured for the site.
pub fn build_client() -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

/// Downloads one page as text.
///
/// A 429 response is retried exactly once after a pause; any other non-2xx
/// status is an error.
pub async fn download_page(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("Downloading page from: {}", url);
    tokio::time::sleep(Duration::from_millis(REQUEST_DELAY_MS)).await;

    let mut response = send(client, url).await?;

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            "Too many requests to {}. Retrying after {} ms",
            url,
            RATE_LIMIT_RETRY_DELAY_MS
        );
        tokio::time::sleep(Duration::from_millis(RATE_LIMIT_RETRY_DELAY_MS)).await;
        response = send(client, url).await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited(url.to_string()));
        }
    }

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        return Err(FetchError::Http { status, url: url.to_string() });
    }

    let body = response.text().await?;
    tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
    Ok(body)
}

async fn send(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, FetchError> {
    let response = client
        .get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await?;
    Ok(response)
}
