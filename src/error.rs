// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::services::{import_violations, ManagementError, SurferError, UserError};
use crate::validation::{FieldViolation, ValidationErrors};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Vec<FieldViolation>,
    },
    EmptyUpdate(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::EmptyUpdate(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::EmptyUpdate(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors, .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::EmptyUpdate(_) => "EMPTY_UPDATE",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Vec<FieldViolation>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
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

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation_error("Invalid input", errors.violations())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::EmptyUpdate => ApiError::EmptyUpdate("No fields to update".to_string()),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) | DatabaseError::Sqlx(sqlx::Error::Io(_)) => {
                tracing::error!("Database unreachable: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<SurferError> for ApiError {
    fn from(err: SurferError) -> Self {
        match err {
            SurferError::InvalidInput(errors) => errors.into(),
            SurferError::SpotNotFound => ApiError::not_found("Spot not found"),
            SurferError::Internal(e) => e.into(),
        }
    }
}

impl From<ManagementError> for ApiError {
    fn from(err: ManagementError) -> Self {
        match err {
            ManagementError::InvalidInput(errors) => errors.into(),
            ManagementError::InvalidImportEntries(rejected) => ApiError::validation_error(
                format!("{} import entries are invalid", rejected.len()),
                import_violations(&rejected),
            ),
            ManagementError::SpotNotFound => ApiError::not_found("Spot not found"),
            ManagementError::LocationNotFound => ApiError::not_found("Location not found"),
            ManagementError::EmptyUpdateEntry => ApiError::EmptyUpdate("No fields to update".to_string()),
            ManagementError::LocationProvider(e) => {
                tracing::error!("Location provider error: {}", e);
                ApiError::bad_gateway("Location provider unavailable")
            }
            ManagementError::Internal(e) => e.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidInput(errors) => errors.into(),
            UserError::UserExists => ApiError::conflict("User already exists"),
            UserError::InvalidCredentials => ApiError::unauthorized("Invalid e-mail or password"),
            UserError::Token(e) => {
                tracing::error!("Token error: {}", e);
                ApiError::internal_server_error("Failed to issue token")
            }
            UserError::PasswordHash(e) => {
                tracing::error!("Password hashing error: {}", e);
                ApiError::internal_server_error("Failed to store credentials")
            }
            UserError::Internal(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ImportEntryError;
    use crate::validation::{FieldError, Validator};

    #[test]
    fn validation_errors_keep_field_order() {
        let mut v = Validator::new();
        v.register(|| false, FieldError::InvalidLatitude)
            .register(|| false, FieldError::InvalidCountryCode);
        let api: ApiError = SurferError::InvalidInput(v.validate().unwrap_err()).into();

        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        let body = api.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"][0]["field"], "latitude");
        assert_eq!(body["field_errors"][1]["field"], "country_code");
    }

    #[test]
    fn empty_update_is_its_own_code() {
        let api: ApiError = ManagementError::EmptyUpdateEntry.into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(api.error_code(), "EMPTY_UPDATE");
        assert!(api.to_json().get("field_errors").is_none());
    }

    #[test]
    fn import_errors_are_prefixed_with_the_entry_index() {
        let api: ApiError = ManagementError::InvalidImportEntries(vec![
            ImportEntryError { index: 0, errors: FieldError::InvalidLatitude.into() },
            ImportEntryError { index: 3, errors: FieldError::InvalidSpotName.into() },
        ])
        .into();
        let body = api.to_json();
        assert_eq!(body["message"], "2 import entries are invalid");
        assert_eq!(body["field_errors"][0]["field"], "[0].latitude");
        assert_eq!(body["field_errors"][1]["field"], "[3].name");
    }

    #[test]
    fn not_found_kinds() {
        let spot: ApiError = SurferError::SpotNotFound.into();
        let location: ApiError = ManagementError::LocationNotFound.into();
        assert_eq!(spot.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(location.message(), "Location not found");
    }

    #[test]
    fn infrastructure_errors_are_opaque() {
        let api: ApiError = DatabaseError::QueryError("syntax error at or near".into()).into();
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message().contains("syntax"));

        let api: ApiError = DatabaseError::ConfigMissing("DATABASE_URL").into();
        assert_eq!(api.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
