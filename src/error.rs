use aide::OperationOutput;
use axum::{http::StatusCode, response::IntoResponse, Json};
use log::error;
use schemars::JsonSchema;
use serde_json::json;

/// Represent errors in the application
///
/// All `ServiceError`s can be transformed to http errors.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
pub enum ServiceError {
    InternalServerError(String),
    NotFound,
    BadRequest(&'static str, String),
    Unauthorized(&'static str),
    Forbidden,
    Conflict(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for ServiceError {}

/// Helper for `ServiceError` result
pub type ServiceResult<T> = Result<T, ServiceError>;

impl OperationOutput for ServiceError {
    type Inner = String;
}
impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServiceError::InternalServerError(ref cause) => {
                error!("Internal server error: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "cause": cause })),
                )
            }
            ServiceError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Not found",
                })),
            ),
            ServiceError::BadRequest(message, ref cause) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": message,
                    "cause": cause,
                })),
            ),
            ServiceError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": message,
                })),
            ),
            ServiceError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "Missing permissions",
                })),
            ),
            ServiceError::Conflict(ref cause) => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "Conflict",
                    "cause": cause,
                })),
            ),
        }
        .into_response()
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => ServiceError::NotFound,
            // Check constraints guard the shape of a single row, eg. a time range
            // that became inverted by a partial update.
            sqlx::Error::Database(ref db_error) if db_error.is_check_violation() => {
                ServiceError::BadRequest("Invalid input", db_error.message().to_owned())
            }
            sqlx::Error::Database(ref db_error)
                if db_error.is_unique_violation() || db_error.is_foreign_key_violation() =>
            {
                ServiceError::Conflict(db_error.message().to_owned())
            }
            error => ServiceError::InternalServerError(error.to_string()),
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            return ServiceError::NotFound;
        }
        ServiceError::InternalServerError(error.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for ServiceError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        ServiceError::InternalServerError(format!("Could not run migrations: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (
                ServiceError::BadRequest("Invalid range", "from >= to".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Unauthorized("Missing login"),
                StatusCode::UNAUTHORIZED,
            ),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (
                ServiceError::Conflict("duplicate key".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::InternalServerError("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(
            ServiceError::from(sqlx::Error::RowNotFound),
            ServiceError::NotFound
        );
    }

    #[derive(Debug)]
    struct FakeDatabaseError(sqlx::error::ErrorKind);

    impl std::fmt::Display for FakeDatabaseError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl std::error::Error for FakeDatabaseError {}

    impl sqlx::error::DatabaseError for FakeDatabaseError {
        fn message(&self) -> &str {
            "violates constraint"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.0 {
                sqlx::error::ErrorKind::UniqueViolation => sqlx::error::ErrorKind::UniqueViolation,
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    sqlx::error::ErrorKind::ForeignKeyViolation
                }
                sqlx::error::ErrorKind::CheckViolation => sqlx::error::ErrorKind::CheckViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn database_error(kind: sqlx::error::ErrorKind) -> ServiceError {
        ServiceError::from(sqlx::Error::Database(Box::new(FakeDatabaseError(kind))))
    }

    #[test]
    fn test_constraint_violations() {
        assert!(matches!(
            database_error(sqlx::error::ErrorKind::CheckViolation),
            ServiceError::BadRequest("Invalid input", _)
        ));
        assert!(matches!(
            database_error(sqlx::error::ErrorKind::UniqueViolation),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            database_error(sqlx::error::ErrorKind::ForeignKeyViolation),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            database_error(sqlx::error::ErrorKind::Other),
            ServiceError::InternalServerError(_)
        ));
    }

    #[test]
    fn test_io_errors() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ServiceError::from(missing), ServiceError::NotFound);

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            ServiceError::from(denied),
            ServiceError::InternalServerError(_)
        ));
    }
}
