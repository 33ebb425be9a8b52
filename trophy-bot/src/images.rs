//! Image host client.

use std::time::Duration;

use reqwest::Client;

/// Downloads reward images as raw bytes.
pub struct ImageClient {
    http_client: Client,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Image host returned status {0}")]
    BadStatus(u16),
}

impl ImageClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ImageError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Fetch the bytes at `url`. Any non-success status is an error.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        tracing::debug!("Fetching image: {}", url);

        let response = self.http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::BadStatus(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
