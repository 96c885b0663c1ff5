use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access-token claims. The token carries the account id and email so the
/// middleware can identify the caller without a database lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub iss: String, // issuing service
    pub exp: i64,   // expiration timestamp
    pub iat: i64,   // issued at timestamp
}

/// The verified caller, as the auth middleware injects it into request
/// extensions and GraphQL context data.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}
