use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::labels::{ReportStatus, ReportType};
use crate::domain::report::Report;
use crate::domain::types::{ReportId, TypeConstraintError, UserId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: i64,
    pub report_type: ReportType,
    pub status: ReportStatus,
    pub reason: String,
    #[serde(default)]
    pub description: Option<String>,
    pub reporter_id: i64,
    #[serde(default)]
    pub reporter_name: Option<String>,
    pub target_id: i64,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ReportRecord> for Report {
    type Error = TypeConstraintError;

    fn try_from(record: ReportRecord) -> Result<Self, Self::Error> {
        Ok(Report {
            id: ReportId::new(record.id)?,
            report_type: record.report_type,
            status: record.status,
            reason: record.reason,
            description: record.description.unwrap_or_default(),
            reporter_id: UserId::new(record.reporter_id)?,
            reporter_name: record.reporter_name.unwrap_or_default(),
            target_id: record.target_id,
            created_at: record.created_at,
        })
    }
}
