//! HTTP client for the remote challenge-generation collaborator.
//!
//! The endpoint is treated as untrusted and unreliable: requests carry a
//! fixed timeout, responses are parsed but never trusted (validation
//! happens in the source), and every failure maps to a [`ContentError`]
//! that the content source recovers from locally. The client owns a small
//! current-thread runtime so callers stay synchronous and the engine does
//! not require a host async runtime.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::runtime::Runtime;
use url::Url;

use super::{ChallengeKind, ContentProvider};
use crate::error::ContentError;

/// Per-request budget before the source falls back locally.
pub const REQUEST_TIMEOUT_MS: u64 = 3_000;

/// Challenge-generation HTTP client.
pub struct RemoteContentClient {
    endpoint: Url,
    client: Client,
    runtime: Runtime,
}

impl RemoteContentClient {
    pub fn new(endpoint: &str) -> Result<Self, ContentError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| ContentError::Http(format!("bad endpoint: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .map_err(|e| ContentError::Http(e.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ContentError::Runtime(e.to_string()))?;
        Ok(Self {
            endpoint,
            client,
            runtime,
        })
    }

    fn request_once(&self, kind: ChallengeKind) -> Result<Value, ContentError> {
        let body = serde_json::json!({ "kind": kind });
        let request = self.client.post(self.endpoint.clone()).json(&body);

        self.runtime.block_on(async {
            let response = tokio::time::timeout(
                Duration::from_millis(REQUEST_TIMEOUT_MS),
                request.send(),
            )
            .await
            .map_err(|_| ContentError::Timeout {
                timeout_ms: REQUEST_TIMEOUT_MS,
            })?
            .map_err(|e| ContentError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ContentError::Http(format!("HTTP {status}")));
            }
            response
                .json::<Value>()
                .await
                .map_err(|e| ContentError::MalformedResponse(e.to_string()))
        })
    }
}

impl ContentProvider for RemoteContentClient {
    fn generate(&mut self, kind: ChallengeKind) -> Result<Value, ContentError> {
        self.request_once(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_endpoint() {
        assert!(RemoteContentClient::new("not a url").is_err());
    }
}
