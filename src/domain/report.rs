use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::labels::{Labeled, ReportStatus, ReportType};
use crate::domain::types::{ReportId, UserId};
use crate::listing::Identified;
use crate::listing::refine::Refinable;

pub const TYPE_FILTER: &str = "type";
pub const STATUS_FILTER: &str = "status";

/// Moderation report filed against a post, a comment or a user.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Report {
    pub id: ReportId,
    pub report_type: ReportType,
    pub status: ReportStatus,
    pub reason: String,
    pub description: String,
    pub reporter_id: UserId,
    pub reporter_name: String,
    /// Identifier of the reported post, comment or user.
    pub target_id: i64,
    pub created_at: NaiveDateTime,
}

impl Report {
    /// Resolved and dismissed reports take no further status changes.
    pub fn is_closed(&self) -> bool {
        matches!(self.status, ReportStatus::Resolved | ReportStatus::Dismissed)
    }
}

impl Identified for Report {
    type Id = ReportId;

    fn id(&self) -> ReportId {
        self.id
    }
}

impl Refinable for Report {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.reason.as_str(),
            self.description.as_str(),
            self.reporter_name.as_str(),
        ]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            TYPE_FILTER => Some(self.report_type.label()),
            STATUS_FILTER => Some(self.status.label()),
            _ => None,
        }
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.created_at
    }
}
