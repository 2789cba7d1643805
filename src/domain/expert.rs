use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{FullName, UserEmail, UserId};
use crate::listing::Identified;
use crate::listing::refine::Refinable;

/// Filter key selecting experts by field of expertise.
pub const DOMAIN_FILTER: &str = "domain";

/// Domain expert offering mentoring service packages.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Expert {
    pub id: UserId,
    pub full_name: FullName,
    pub email: UserEmail,
    pub title: String,
    pub domain: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub service_packages: u64,
    pub is_featured: bool,
    pub joined_at: NaiveDateTime,
}

impl Identified for Expert {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl Refinable for Expert {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.full_name.as_str(),
            self.email.as_str(),
            self.title.as_str(),
            self.bio.as_str(),
        ];
        fields.extend(self.skills.iter().map(String::as_str));
        fields
    }

    fn category(&self, key: &str) -> Option<&str> {
        (key == DOMAIN_FILTER).then_some(self.domain.as_str())
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.joined_at
    }

    fn popularity(&self) -> u64 {
        self.service_packages
    }

    fn is_trending(&self) -> bool {
        self.is_featured
    }
}
