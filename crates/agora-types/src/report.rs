//! Moderation reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::ids::{PostId, ReportId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportType {
    User,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Pending,
    Resolved,
}

/// A report as listed by `GET /v1/reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub content: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub reporter_id: UserId,
    #[serde(default)]
    pub reported_user_id: Option<UserId>,
    #[serde(default)]
    pub reported_post_id: Option<PostId>,
}

impl Report {
    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }
}

/// What a new report points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTarget {
    User(UserId),
    Post(PostId),
}

impl ReportTarget {
    pub fn report_type(&self) -> ReportType {
        match self {
            ReportTarget::User(_) => ReportType::User,
            ReportTarget::Post(_) => ReportType::Post,
        }
    }
}

/// Body of `POST /v1/reports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub target: ReportTarget,
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewReportBody<'a> {
    #[serde(rename = "type")]
    report_type: ReportType,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reported_user_id: Option<&'a UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reported_post_id: Option<&'a PostId>,
}

impl Serialize for NewReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (reported_user_id, reported_post_id) = match &self.target {
            ReportTarget::User(id) => (Some(id), None),
            ReportTarget::Post(id) => (None, Some(id)),
        };

        NewReportBody {
            report_type: self.target.report_type(),
            content: &self.content,
            reported_user_id,
            reported_post_id,
        }
        .serialize(serializer)
    }
}
