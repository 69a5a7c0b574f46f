use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::TransportError;

pub const HEALTH_PATH: &str = "api/health";

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

/// Probes `{server_url}/api/health`; `Ok(true)` when the server reports itself ready.
pub async fn check_health(http: &Client, server_url: &Url) -> Result<bool, TransportError> {
    let url = server_url.join(HEALTH_PATH)?;
    let response = http
        .get(url.clone())
        .send()
        .await
        .map_err(TransportError::Connect)?;
    if !response.status().is_success() {
        return Err(TransportError::Status(response.status()));
    }
    let body: HealthResponse = response.json().await.map_err(TransportError::Body)?;
    debug!(url = %url, ok = body.ok, "health: probe finished");
    Ok(body.ok)
}

#[cfg(test)]
#[path = "tests/health_tests.rs"]
mod tests;
