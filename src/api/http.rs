// Small blocking HTTP transport used by both API families. It owns the
// reqwest client and the base URL, and turns transport failures and non-2xx
// statuses into `ApiError`s so the family clients only deal with payloads.

use super::error::{ApiError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    pub fn new(host: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {}", e)))?;
        Ok(Transport {
            client,
            base_url: base_url(host),
        })
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        execute(self.client.get(&url).query(query))
    }

    pub fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        execute(self.client.post(&url).query(query).json(body))
    }
}

fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let res = request.send()?;
    let status = res.status();
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(ApiError::Auth);
    }
    if !status.is_success() {
        let body = res.text().unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let text = res.text()?;
    tracing::trace!(body = %text, "response");
    Ok(serde_json::from_str(&text)?)
}

/// Hosts are configured bare (`mythermostat.info`); a scheme in the value
/// is kept as given.
pub(crate) fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
