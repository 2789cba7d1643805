use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::expert::Expert;
use crate::domain::types::{FullName, TypeConstraintError, UserEmail, UserId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertRecord {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub service_packages: u64,
    #[serde(default)]
    pub featured: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ExpertRecord> for Expert {
    type Error = TypeConstraintError;

    fn try_from(record: ExpertRecord) -> Result<Self, Self::Error> {
        Ok(Expert {
            id: UserId::new(record.id)?,
            full_name: FullName::new(record.full_name)?,
            email: UserEmail::new(record.email)?,
            title: record.title,
            domain: record.domain,
            bio: record.bio,
            skills: record.skills,
            service_packages: record.service_packages,
            is_featured: record.featured,
            joined_at: record.created_at,
        })
    }
}
