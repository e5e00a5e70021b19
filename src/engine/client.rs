use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use tracing::{debug, info};

use super::parse::parse_snapshot;
use super::snapshot::Snapshot;

/// Which engine endpoint a fetch goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineRequest {
    /// Current snapshot without advancing verification.
    Content,
    /// Advance verification by one step and return the resulting snapshot.
    StepVerification,
}

impl EngineRequest {
    pub fn label(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::StepVerification => "step verification",
        }
    }

    fn path(self) -> &'static str {
        match self {
            Self::Content => "/api/content",
            Self::StepVerification => "/api/step_verification",
        }
    }
}

pub struct EngineClient {
    base_url: String,
    http: Client,
}

impl EngineClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch(&self, request: EngineRequest) -> Result<Snapshot> {
        let url = format!("{}{}", self.base_url, request.path());
        debug!(%url, request = request.label(), "sending engine request");

        let builder = match request {
            EngineRequest::Content => self.http.get(&url),
            EngineRequest::StepVerification => self.http.post(&url),
        };
        let response = builder
            .send()
            .with_context(|| format!("failed to reach the engine at {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!(
                "engine {} request failed with status {status}: {body}",
                request.label()
            ));
        }

        let body = response
            .text()
            .with_context(|| format!("failed to read engine response from {url}"))?;
        let snapshot = parse_snapshot(&body)
            .with_context(|| format!("malformed {} response", request.label()))?;

        info!(
            request = request.label(),
            nodes = snapshot.state_space.node_count(),
            "received snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let client = EngineClient::new("http://localhost:8080//", Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn maps_requests_to_endpoints() {
        assert_eq!(EngineRequest::Content.path(), "/api/content");
        assert_eq!(
            EngineRequest::StepVerification.path(),
            "/api/step_verification"
        );
    }
}
