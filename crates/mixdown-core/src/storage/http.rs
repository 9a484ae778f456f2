//! HTTP object storage client (ureq, blocking)
//!
//! Objects are read with a plain GET on their URL and written with a PUT to
//! `{endpoint}/{bucket}/{key}`. This matches S3-compatible gateways that
//! accept bearer-token uploads.

use std::io::Read;
use std::time::Duration;

use crate::config::StorageConfig;
use crate::error::{MixdownError, Result};

use super::{validate_key, BlobStore};

/// [`BlobStore`] backed by an HTTP object storage endpoint
pub struct HttpBlobStore {
    agent: ureq::Agent,
    endpoint: String,
    bucket: String,
    public_url: Option<String>,
    auth_token: Option<String>,
}

impl HttpBlobStore {
    /// Build a client from the storage section of the service config
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(MixdownError::invalid(format!(
                "storage endpoint '{}' is not an http(s) URL",
                config.endpoint
            )));
        }
        let bucket = config.bucket.trim_matches('/').to_string();
        if bucket.is_empty() {
            return Err(MixdownError::invalid("storage bucket is empty"));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build();

        log::info!("Object storage: {}/{}", endpoint, bucket);

        Ok(Self {
            agent,
            endpoint,
            bucket,
            public_url: config
                .public_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            auth_token: config.auth_token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Upload URL for `key`
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    /// URL clients use to download `key`
    pub fn public_url(&self, key: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/{}", base, key),
            None => self.object_url(key),
        }
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.auth_token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }
}

impl BlobStore for HttpBlobStore {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("GET {}", url);
        let response = self
            .authorize(self.agent.get(url))
            .call()
            .map_err(|e| request_error(url, e))?;

        let mut data = Vec::new();
        response.into_reader().read_to_end(&mut data)?;
        log::debug!("Fetched {} bytes from {}", data.len(), url);
        Ok(data)
    }

    fn store(&self, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        validate_key(key)?;
        let url = self.object_url(key);
        log::info!("Uploading {} bytes to {}", data.len(), url);

        self.authorize(self.agent.put(&url))
            .set("Content-Type", content_type)
            .send_bytes(data)
            .map_err(|e| request_error(&url, e))?;

        Ok(self.public_url(key))
    }
}

/// Map ureq failures: malformed URLs are the caller's fault, the rest is storage
fn request_error(url: &str, error: ureq::Error) -> MixdownError {
    match error {
        ureq::Error::Status(code, response) => MixdownError::Storage(format!(
            "{} returned HTTP {} {}",
            url,
            code,
            response.status_text()
        )),
        ureq::Error::Transport(transport) => match transport.kind() {
            ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                MixdownError::invalid(format!("invalid URL '{}': {}", url, transport))
            }
            _ => MixdownError::Storage(format!("{}: {}", url, transport)),
        },
    }
}
