use async_graphql::ErrorExtensions;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure classes shared by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// All field-level problems collected in one pass, for redisplay.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Role deletion refused while users still hold the role. Nothing was
    /// mutated.
    #[error("role is still assigned to one or more users")]
    RoleInUse,

    /// The row changed underneath us between read and write. The caller may
    /// re-read and retry.
    #[error("record was modified by another operation")]
    Conflict,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        ServiceError::NotFound { entity }
    }
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| match self {
            ServiceError::NotFound { .. } => e.set("code", "NOT_FOUND"),
            ServiceError::Validation(messages) => {
                e.set("code", "VALIDATION_FAILED");
                e.set("messages", messages.clone());
            }
            ServiceError::RoleInUse => e.set("code", "ROLE_IN_USE"),
            ServiceError::Conflict => e.set("code", "CONFLICT"),
            ServiceError::InvalidCredentials => e.set("code", "UNAUTHENTICATED"),
            ServiceError::Database(_) | ServiceError::PasswordHash(_) | ServiceError::Token(_) => {
                e.set("code", "INTERNAL")
            }
        })
    }
}
