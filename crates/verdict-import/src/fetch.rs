//! Single-document fetch.
//!
//! Transport problems (connection refused, timeout, non-2xx status, missing
//! file) are [`ReportError::Fetch`]. A body that arrives but is not JSON is
//! [`ReportError::MalformedReport`].

use serde_json::Value;
use verdict_core::ReportError;

use crate::loader::LoaderConfig;
use crate::location::ReportLocation;

/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(config: &LoaderConfig) -> Result<Self, ReportError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ReportError::fetch("<client>", format!("cannot build HTTP client: {e}")))?;
        Ok(Fetcher { client })
    }

    pub async fn fetch_document(&self, location: &ReportLocation) -> Result<Value, ReportError> {
        let bytes = match location {
            ReportLocation::Remote(url) => self.fetch_remote(url).await?,
            ReportLocation::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| ReportError::fetch(location.to_string(), e.to_string()))?,
        };
        tracing::debug!(%location, bytes = bytes.len(), "fetched document");
        parse_document(location, &bytes)
    }

    async fn fetch_remote(&self, url: &reqwest::Url) -> Result<Vec<u8>, ReportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ReportError::fetch(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::fetch(url.as_str(), format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ReportError::fetch(url.as_str(), format!("reading body: {e}")))?;
        Ok(body.to_vec())
    }
}

pub fn parse_document(location: &ReportLocation, bytes: &[u8]) -> Result<Value, ReportError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ReportError::malformed(format!("{location} is not valid JSON: {e}")))
}
