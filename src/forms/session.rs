use serde::Deserialize;

/// Sign-in with a JWT issued by the backend's auth endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
}
