use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

const USER_AGENT: &str = concat!("cfn_scraper/", env!("CARGO_PKG_VERSION"));

pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

/// One GET per call, awaited to completion before the caller moves on.
/// Transport failures and non-success statuses propagate; no retry.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    debug!("GET {url}");
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("bad status: {url}"))?;
    response
        .text()
        .await
        .with_context(|| format!("failed to read body: {url}"))
}
