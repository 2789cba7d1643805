//! Domain entities and value objects shared by the portal views.

pub mod chat;
pub mod comment;
pub mod expert;
pub mod labels;
pub mod post;
pub mod report;
pub mod types;
pub mod user;
