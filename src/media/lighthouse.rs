//! Lighthouse storage client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::schema::MediaConfig;
use crate::media::{ContentStore, MediaReference, UploadError};
use crate::observability::metrics;

/// Client for the Lighthouse upload API.
#[derive(Debug)]
pub struct LighthouseClient {
    http: reqwest::Client,
    api_url: String,
    gateway_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

impl LighthouseClient {
    /// Build a client from configuration.
    ///
    /// The API key is read from the environment variable named in the
    /// config and never logged.
    pub fn from_config(config: &MediaConfig) -> Result<Self, UploadError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| UploadError::MissingKey(config.api_key_env.clone()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            gateway_url: config.gateway_url.clone(),
            api_key,
        })
    }
}

/// Public gateway URL for a content identifier.
fn gateway_link(gateway_url: &str, cid: &str) -> String {
    format!("{}/{}", gateway_url.trim_end_matches('/'), cid)
}

#[async_trait]
impl ContentStore for LighthouseClient {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<MediaReference, UploadError> {
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            metrics::record_upload("error");
            return Err(UploadError::Status(response.status().as_u16()));
        }

        let body: AddResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Malformed(e.to_string()))?;
        if body.hash.is_empty() {
            metrics::record_upload("error");
            return Err(UploadError::Malformed("Empty content hash".to_string()));
        }

        metrics::record_upload("ok");
        tracing::info!(cid = %body.hash, size, "Media uploaded");

        Ok(MediaReference {
            url: gateway_link(&self.gateway_url, &body.hash),
            cid: body.hash,
        })
    }
}
