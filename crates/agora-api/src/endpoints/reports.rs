//! Moderation reports.

use agora_types::{DataResult, NewReport, Report, ReportId};
use reqwest::Method;

use crate::AgoraClient;

impl AgoraClient {
    /// `POST /v1/reports`.
    pub async fn create_report(&self, report: &NewReport) -> DataResult<Report> {
        Ok(self.send_json(Method::POST, &["reports"], report).await?)
    }

    /// `GET /v1/reports`.
    pub async fn reports(&self) -> DataResult<Vec<Report>> {
        Ok(self.get_json(&["reports"], &[]).await?)
    }

    /// `PATCH /v1/reports/{id}/resolve`.
    pub async fn resolve_report(&self, report_id: &ReportId) -> DataResult<()> {
        Ok(self
            .send_unit(Method::PATCH, &["reports", report_id.as_str(), "resolve"])
            .await?)
    }
}
