use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::labels::{UserRole, UserStatus};
use crate::domain::types::{FullName, TypeConstraintError, UserEmail, UserId};
use crate::domain::user::User;

/// User row as serialised by the backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: NaiveDateTime,
}

impl TryFrom<UserRecord> for User {
    type Error = TypeConstraintError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(record.id)?,
            full_name: FullName::new(record.full_name)?,
            email: UserEmail::new(record.email)?,
            role: record.role,
            status: record.status,
            created_at: record.created_at,
        })
    }
}

/// Body of `PATCH /users/{id}/status`.
#[derive(Debug, Serialize)]
pub struct StatusChangeBody<S> {
    pub status: S,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_keys_decode_into_enums() {
        let record: UserRecord = serde_json::from_str(
            r#"{
                "id": 4,
                "fullName": "John Carter",
                "email": "John@Example.com",
                "role": "PROJECT_MEMBER",
                "status": "ACTIVE",
                "createdAt": "2024-02-01T09:30:00"
            }"#,
        )
        .unwrap();

        let user = User::try_from(record).unwrap();
        assert_eq!(user.role, UserRole::Member);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.email.as_str(), "john@example.com");
    }

    #[test]
    fn unknown_role_key_is_rejected() {
        let result: Result<UserRecord, _> = serde_json::from_str(
            r#"{"id": 4, "fullName": "J", "email": "j@example.com", "role": "Member",
                "status": "ACTIVE", "createdAt": "2024-02-01T09:30:00"}"#,
        );
        assert!(result.is_err());
    }
}
