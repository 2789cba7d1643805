//! Signed-in user extracted from the identity cookie.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, UserId};
use crate::models::config::ServerConfig;

/// Claims of the backend-issued JWT kept as the session identity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Backend user id.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
    /// Raw token, forwarded to the backend as a bearer token.
    #[serde(skip)]
    pub token: String,
}

impl AuthenticatedUser {
    /// Verifies `token` and reads its claims.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<AuthenticatedUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(AuthenticatedUser {
            token: token.to_string(),
            ..data.claims
        })
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        let id = self
            .sub
            .trim()
            .parse::<i64>()
            .map_err(|_| TypeConstraintError::InvalidId(self.sub.clone()))?;
        UserId::new(id)
    }
}

fn extract(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let identity = req
        .get_identity()
        .map_err(|_| actix_web::error::ErrorUnauthorized("not signed in"))?;
    let token = identity
        .id()
        .map_err(|_| actix_web::error::ErrorUnauthorized("not signed in"))?;

    let config = req.app_data::<web::Data<ServerConfig>>().ok_or_else(|| {
        log::error!("ServerConfig is not registered as app data");
        actix_web::error::ErrorInternalServerError("server misconfigured")
    })?;

    AuthenticatedUser::from_token(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        actix_web::error::ErrorUnauthorized("session expired")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    const SECRET: &str = "test-secret";

    fn claims(sub: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: sub.to_string(),
            email: "ann@example.com".to_string(),
            name: "Ann".to_string(),
            roles: vec!["ADMIN".to_string()],
            exp: 4_102_444_800,
            token: String::new(),
        }
    }

    fn sign(user: &AuthenticatedUser, secret: &str) -> String {
        encode(
            &Header::default(),
            user,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips_claims() {
        let token = sign(&claims("12"), SECRET);
        let user = AuthenticatedUser::from_token(&token, SECRET).unwrap();
        assert_eq!(user.token, token);
        assert!(user.has_role("ADMIN"));
        assert!(!user.has_role("MODERATOR"));
        assert_eq!(user.user_id().unwrap().get(), 12);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(&claims("12"), SECRET);
        assert!(AuthenticatedUser::from_token(&token, "other").is_err());
    }

    #[test]
    fn non_numeric_subject_has_no_user_id() {
        assert_eq!(
            claims("abc").user_id(),
            Err(TypeConstraintError::InvalidId("abc".to_string()))
        );
    }
}
