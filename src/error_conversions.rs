//! Error conversion glue between the domain, repository and service layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! the `From` impls live here instead.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::Validation(val.to_string())
    }
}

#[cfg(feature = "server")]
mod server {
    use crate::domain::types::TypeConstraintError;
    use crate::forms::FormError;
    use crate::listing::mutation::MutationError;
    use crate::listing::query::ListQueryError;
    use crate::messaging::MessagingError;
    use crate::services::ServiceError;

    impl From<TypeConstraintError> for ServiceError {
        fn from(val: TypeConstraintError) -> Self {
            ServiceError::TypeConstraint(val.to_string())
        }
    }

    impl From<ListQueryError> for ServiceError {
        fn from(val: ListQueryError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<FormError> for ServiceError {
        fn from(val: FormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<MessagingError> for ServiceError {
        fn from(val: MessagingError) -> Self {
            ServiceError::Messaging(val.to_string())
        }
    }

    impl From<MutationError> for ServiceError {
        fn from(val: MutationError) -> Self {
            match val {
                MutationError::NotConfirmed => ServiceError::Form(val.to_string()),
                MutationError::InFlight => ServiceError::Conflict(val.to_string()),
                MutationError::UnknownRow => ServiceError::NotFound,
                MutationError::Remote(message) => ServiceError::Internal(message),
            }
        }
    }
}
