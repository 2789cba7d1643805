use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::labels::{Labeled, UserRole, UserStatus};
use crate::domain::types::{FullName, UserEmail, UserId};
use crate::listing::Identified;
use crate::listing::refine::Refinable;

/// Filter key selecting users by role label.
pub const ROLE_FILTER: &str = "role";
/// Filter key selecting users by status label.
pub const STATUS_FILTER: &str = "status";

/// Platform account as listed in the admin and moderator directories.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub full_name: FullName,
    pub email: UserEmail,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: NaiveDateTime,
}

impl Identified for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl Refinable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.full_name.as_str(), self.email.as_str()]
    }

    fn category(&self, key: &str) -> Option<&str> {
        match key {
            ROLE_FILTER => Some(self.role.label()),
            STATUS_FILTER => Some(self.status.label()),
            _ => None,
        }
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.created_at
    }
}
