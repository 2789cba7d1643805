//! Wire models exchanged with the backend API and portal configuration.

#[cfg(feature = "server")]
pub mod auth;
pub mod comment;
#[cfg(feature = "server")]
pub mod config;
pub mod expert;
pub mod like;
pub mod page;
pub mod post;
pub mod report;
pub mod user;
