//! Moderation reports.

use std::sync::Arc;

use agora_types::{DataResult, NewReport, Report, ReportId, ReportTarget};
use tracing::{debug, info, warn};

use crate::remote::ReportRemote;
use crate::session::AuthState;
use crate::store::{Store, StoreReader};

/// Owns the report list shown to moderators.
pub struct ReportRepository {
    remote: Arc<dyn ReportRemote>,
    auth: AuthState,
    reports: Store<Report>,
}

impl ReportRepository {
    pub fn new(remote: Arc<dyn ReportRemote>, auth: AuthState) -> Self {
        Self {
            remote,
            auth,
            reports: Store::new(),
        }
    }

    pub fn reports(&self) -> StoreReader<Report> {
        self.reports.reader()
    }

    /// File a report against a user or a post.
    pub async fn create_report(
        &self,
        target: ReportTarget,
        content: impl Into<String>,
    ) -> DataResult<Report> {
        self.auth.require()?;
        let report = NewReport {
            target,
            content: content.into(),
        };
        let created = self.remote.create_report(&report).await?;
        info!(report_id = %created.id, "Report filed");
        Ok(created)
    }

    /// Replace the cache with the server's list.
    pub async fn load_reports(&self) -> DataResult<()> {
        let reports = self.remote.reports().await.inspect_err(|e| {
            warn!(error = %e, "Report load failed");
        })?;
        debug!(report_count = reports.len(), "Reports loaded");
        self.reports.replace_all(reports);
        Ok(())
    }

    /// Resolve a report, then reload the whole list.
    ///
    /// On failure the list is left untouched.
    pub async fn resolve(&self, report_id: &ReportId) -> DataResult<()> {
        self.auth.require()?;
        self.remote.resolve_report(report_id).await.inspect_err(|e| {
            warn!(report_id = %report_id, error = %e, "Resolve failed");
        })?;
        info!(report_id = %report_id, "Report resolved");
        self.load_reports().await
    }

    pub fn clear(&self) {
        self.reports.clear();
    }
}
