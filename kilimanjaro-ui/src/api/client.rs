//! Browser HTTP client

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde_json::Value;

use kilimanjaro::api::{ApiClient, FetchError};

/// fetch-backed client pointed at one backend origin
#[derive(Debug, Clone)]
pub struct BrowserClient {
    base_url: String,
}

impl BrowserClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait(?Send)]
impl ApiClient for BrowserClient {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let response = Request::get(&self.url(path))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        check_status(&response)?;

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn post(&self, path: &str) -> Result<(), FetchError> {
        let response = Request::post(&self.url(path))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        check_status(&response)
    }
}

fn check_status(response: &Response) -> Result<(), FetchError> {
    if response.ok() {
        Ok(())
    } else {
        Err(FetchError::status(response.status(), response.status_text()))
    }
}
