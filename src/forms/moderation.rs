//! Row-level moderation actions.

use serde::Deserialize;

use crate::domain::labels::Labeled;
use crate::forms::FormError;

/// New status, given as a display label or a backend key.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Parsed status change.
pub struct StatusPayload<S> {
    pub status: S,
}

impl<S: Labeled> TryFrom<StatusForm> for StatusPayload<S> {
    type Error = FormError;

    fn try_from(form: StatusForm) -> Result<Self, Self::Error> {
        Ok(Self {
            status: S::parse(&form.status)?,
        })
    }
}

/// Destructive actions only run with `confirm: true`.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::labels::{ReportStatus, UserStatus};

    #[test]
    fn status_accepts_label_or_key() {
        let payload = StatusPayload::<UserStatus>::try_from(StatusForm {
            status: "suspended".to_string(),
        })
        .unwrap();
        assert_eq!(payload.status, UserStatus::Suspended);

        let payload = StatusPayload::<ReportStatus>::try_from(StatusForm {
            status: "UNDER_REVIEW".to_string(),
        })
        .unwrap();
        assert_eq!(payload.status, ReportStatus::UnderReview);
    }

    #[test]
    fn missing_confirmation_defaults_to_false() {
        let form: ConfirmForm = serde_json::from_str("{}").unwrap();
        assert!(!form.confirm);
    }
}
