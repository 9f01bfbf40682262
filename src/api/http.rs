//! Native HTTP client backed by reqwest

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::client::ApiClient;
use super::error::FetchError;

/// reqwest-backed [`ApiClient`] pointed at one backend origin
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The origin requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait(?Send)]
impl ApiClient for HttpClient {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(self.url(path))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn post(&self, path: &str) -> Result<(), FetchError> {
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ))
        }
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network(format!("request timed out: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_origin_and_path() {
        let client = HttpClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/plugins"), "http://localhost:8000/api/plugins");
    }
}
