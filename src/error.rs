// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::TokenError;
use crate::database::DatabaseError;
use crate::services::ServiceError;

/// HTTP API error with status code, stable code and client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(String),
    /// Duplicate identifiers are reported as 400, not 409.
    Conflict(String),

    // 401 Unauthorized
    Unauthorized(String),
    TokenExpired(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::TokenExpired(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::TokenExpired(_) => "TOKEN_EXPIRED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired("Access token expired".to_string()),
            TokenError::InvalidSignature | TokenError::Malformed => {
                ApiError::unauthorized(format!("Invalid access token: {}", err))
            }
            TokenError::Signing(msg) => {
                tracing::error!("Token signing failed: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            other => {
                // Log the real error but return a generic message
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::validation(msg),
            ServiceError::DuplicateIdentifier(_) => ApiError::conflict(err.to_string()),
            ServiceError::UnknownIdentifier
            | ServiceError::BadCredential
            | ServiceError::NothingToUpdate
            | ServiceError::AmbiguousMatch
            | ServiceError::NothingToUndo
            | ServiceError::NothingToRedo
            | ServiceError::HistoryConflict(_) => ApiError::bad_request(err.to_string()),
            ServiceError::Unauthenticated => ApiError::unauthorized(err.to_string()),
            ServiceError::MissingToken | ServiceError::InvalidOrExpiredToken => ApiError::forbidden(err.to_string()),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ServiceError::Database(db) => db.into(),
            ServiceError::Token(token) => token.into(),
            ServiceError::Password(e) => {
                tracing::error!("Password hashing error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_documented_statuses() {
        let cases = [
            (ServiceError::DuplicateIdentifier("alice".into()), StatusCode::BAD_REQUEST, "CONFLICT"),
            (ServiceError::BadCredential, StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ServiceError::UnknownIdentifier, StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ServiceError::NothingToUndo, StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ServiceError::HistoryConflict("fk".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ServiceError::MissingToken, StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ServiceError::InvalidOrExpiredToken, StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ServiceError::Forbidden("no"), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ServiceError::NotFound("plan"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ServiceError::Unauthenticated, StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ];
        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), status, "{:?}", api);
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn expired_tokens_get_their_own_code() {
        let api: ApiError = TokenError::Expired.into();
        assert_eq!(api.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(api.error_code(), "TOKEN_EXPIRED");

        let api: ApiError = TokenError::Malformed.into();
        assert_eq!(api.error_code(), "UNAUTHORIZED");
    }

    #[test]
    fn storage_details_are_not_leaked() {
        let api: ApiError = ServiceError::Database(DatabaseError::QueryError("relation x".into())).into();
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message().contains("relation"));
    }

    #[test]
    fn body_carries_message_and_code() {
        let body = ApiError::not_found("plan not found").to_json();
        assert_eq!(body["error"], json!(true));
        assert_eq!(body["message"], json!("plan not found"));
        assert_eq!(body["code"], json!("NOT_FOUND"));
    }
}
