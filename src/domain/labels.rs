//! Classification enums shared by the list views.
//!
//! Every enum carries one table mapping each variant to the label shown in
//! the portal and to the key the backend API expects. Both directions are
//! generated from the same table so a missing arm is a compile error.

use std::fmt::{Display, Formatter};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::types::TypeConstraintError;

/// Enumerations with a display label and a backend key per variant.
pub trait Labeled: Sized + Copy + 'static {
    /// Human readable name of the enumeration, used in error messages.
    const KIND: &'static str;
    /// Every variant in declaration order.
    const ALL: &'static [Self];

    /// Label used by the portal filters.
    fn label(self) -> &'static str;

    /// Key used on the backend wire format.
    fn backend_key(self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.label().eq_ignore_ascii_case(label))
    }

    fn from_backend_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.backend_key() == key)
    }

    /// Parses a portal label, accepting a backend key as a fallback.
    fn parse(value: &str) -> Result<Self, TypeConstraintError> {
        Self::from_label(value)
            .or_else(|| Self::from_backend_key(value))
            .ok_or_else(|| TypeConstraintError::UnknownVariant {
                kind: Self::KIND,
                value: value.to_string(),
            })
    }
}

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => ($label:literal, $key:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl Labeled for $name {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            fn backend_key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.backend_key())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::from_backend_key(&raw)
                    .ok_or_else(|| D::Error::unknown_variant(&raw, &[$($key),+]))
            }
        }
    };
}

labeled_enum!(
    /// Role of a platform account.
    UserRole, "role" {
        Admin => ("Admin", "ADMIN"),
        Moderator => ("Moderator", "MODERATOR"),
        Expert => ("Expert", "DOMAIN_EXPERT"),
        Member => ("Member", "PROJECT_MEMBER"),
    }
);

labeled_enum!(
    /// Lifecycle status of a platform account.
    UserStatus, "status" {
        Active => ("Active", "ACTIVE"),
        Inactive => ("Inactive", "INACTIVE"),
        Suspended => ("Suspended", "SUSPENDED"),
        Banned => ("Banned", "BANNED"),
    }
);

labeled_enum!(
    /// Moderation state of a report.
    ReportStatus, "report status" {
        Pending => ("Pending", "PENDING"),
        UnderReview => ("Under Review", "UNDER_REVIEW"),
        Resolved => ("Resolved", "RESOLVED"),
        Dismissed => ("Dismissed", "DISMISSED"),
    }
);

labeled_enum!(
    /// Kind of content a report points at.
    ReportType, "report type" {
        Post => ("Post", "POST"),
        Comment => ("Comment", "COMMENT"),
        User => ("User", "USER"),
    }
);

labeled_enum!(
    /// Delivery status attached to a direct message.
    MessageStatus, "message status" {
        Sent => ("Sent", "SENT"),
        Delivered => ("Delivered", "DELIVERED"),
        Read => ("Read", "READ"),
    }
);

impl UserRole {
    /// Staff accounts cannot be moderated by other moderators.
    pub fn is_staff(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Moderator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_backend_keys() {
        assert_eq!(UserRole::from_label("Member"), Some(UserRole::Member));
        assert_eq!(UserRole::Member.backend_key(), "PROJECT_MEMBER");
        assert_eq!(UserStatus::from_label("active"), Some(UserStatus::Active));
        assert_eq!(UserStatus::Active.backend_key(), "ACTIVE");
        assert_eq!(
            ReportStatus::from_backend_key("UNDER_REVIEW"),
            Some(ReportStatus::UnderReview)
        );
    }

    #[test]
    fn every_variant_round_trips_through_both_tables() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_label(role.label()), Some(*role));
            assert_eq!(UserRole::from_backend_key(role.backend_key()), Some(*role));
        }
        for status in ReportStatus::ALL {
            assert_eq!(ReportStatus::from_label(status.label()), Some(*status));
        }
    }

    #[test]
    fn parse_reports_unknown_values() {
        assert_eq!(UserRole::parse("DOMAIN_EXPERT"), Ok(UserRole::Expert));
        assert_eq!(
            UserRole::parse("Janitor"),
            Err(TypeConstraintError::UnknownVariant {
                kind: "role",
                value: "Janitor".to_string()
            })
        );
    }

    #[test]
    fn wire_format_uses_backend_keys() {
        let json = serde_json::to_string(&UserRole::Expert).unwrap();
        assert_eq!(json, "\"DOMAIN_EXPERT\"");
        let parsed: ReportType = serde_json::from_str("\"COMMENT\"").unwrap();
        assert_eq!(parsed, ReportType::Comment);
        assert!(serde_json::from_str::<ReportType>("\"Comment\"").is_err());
    }
}
