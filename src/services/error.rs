use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::TokenError;
use crate::database::DatabaseError;

/// Failures of the auth, domain and history services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("login id '{0}' is already registered")]
    DuplicateIdentifier(String),

    #[error("no account with that login id")]
    UnknownIdentifier,

    #[error("password does not match")]
    BadCredential,

    #[error("refresh token missing")]
    MissingToken,

    #[error("refresh token is invalid or expired")]
    InvalidOrExpiredToken,

    #[error("account no longer exists")]
    Unauthenticated,

    #[error("no updatable field supplied")]
    NothingToUpdate,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("more than one user matches")]
    AmbiguousMatch,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("history conflict: {0}")]
    HistoryConflict(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Trims a required text field, rejecting it when blank.
pub fn required(field: &'static str, value: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
