//! HTTP client for the report store.
//!
//! `POST {base}/api/report` answers `201 { "message", "reportId" }`;
//! `GET {base}/api/report/{id}` answers `200 { "id", ...report }` or `404`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{Report, ReportId, ReportTransport, StoredReport};
use crate::error::TransportError;
use crate::storage::TransportConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    report_id: String,
}

/// Report store client.
#[derive(Debug, Clone)]
pub struct HttpReportClient {
    base_url: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpReportClient {
    /// Create new client
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(base_url)?;
        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(10_000),
        })
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        Ok(Self::new(&config.base_url)?.with_timeout(Duration::from_millis(config.timeout_ms)))
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl ReportTransport for HttpReportClient {
    async fn submit(&self, report: &Report) -> Result<ReportId, TransportError> {
        let url = self.endpoint("api/report")?;
        tracing::debug!(%url, events = report.events.len(), "submitting report");

        let response = self
            .client
            .post(url)
            .json(report)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;
        tracing::info!(report_id = %body.report_id, "report submitted");
        Ok(ReportId(body.report_id))
    }

    async fn fetch(&self, id: &ReportId) -> Result<StoredReport, TransportError> {
        let url = self.endpoint(&format!(
            "api/report/{}",
            urlencoding::encode(id.as_str())
        ))?;
        tracing::debug!(%url, "fetching report");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound {
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))
    }
}
