//! Request bodies and query strings accepted by the portal routes.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;
use crate::listing::query::ListQueryError;

pub mod chat;
pub mod community;
pub mod listing;
pub mod moderation;
pub mod session;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Constraint(#[from] TypeConstraintError),

    #[error("{0}")]
    Query(#[from] ListQueryError),

    #[error("invalid id")]
    InvalidId,

    #[error("cannot send a message to yourself")]
    SelfMessage,
}
