use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::{
        chore::ChoreError, exercise::ExerciseError, grocery_item::GroceryItemError,
        team::TeamError, user::UserError, workout_routine::WorkoutRoutineError,
    },
};
use services::services::{auth::AuthError, config::ConfigError};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Team(#[from] TeamError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Chore(#[from] ChoreError),
    #[error(transparent)]
    GroceryItem(#[from] GroceryItemError),
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
    #[error(transparent)]
    WorkoutRoutine(#[from] WorkoutRoutineError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<&'static str> for ApiError {
    fn from(msg: &'static str) -> Self {
        ApiError::BadRequest(msg.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Team(err) => match err {
                TeamError::TeamNotFound => (StatusCode::NOT_FOUND, "TeamError"),
                TeamError::InviteCodeNotFound(_) => (StatusCode::BAD_REQUEST, "TeamError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TeamError"),
            },
            ApiError::User(err) => match err {
                UserError::UserNotFound => (StatusCode::NOT_FOUND, "UserError"),
                UserError::EmailTaken => (StatusCode::CONFLICT, "UserError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "UserError"),
            },
            ApiError::Chore(err) => match err {
                ChoreError::ChoreNotFound => (StatusCode::NOT_FOUND, "ChoreError"),
                ChoreError::ValidationError(_) => (StatusCode::BAD_REQUEST, "ChoreError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ChoreError"),
            },
            ApiError::GroceryItem(err) => match err {
                GroceryItemError::NotFound => (StatusCode::NOT_FOUND, "GroceryItemError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "GroceryItemError"),
            },
            ApiError::Exercise(err) => match err {
                ExerciseError::NotFound => (StatusCode::NOT_FOUND, "ExerciseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ExerciseError"),
            },
            ApiError::WorkoutRoutine(err) => match err {
                WorkoutRoutineError::NotFound => (StatusCode::NOT_FOUND, "WorkoutRoutineError"),
                WorkoutRoutineError::ValidationError(_) => {
                    (StatusCode::BAD_REQUEST, "WorkoutRoutineError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "WorkoutRoutineError"),
            },
            ApiError::Auth(err) => match err {
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "AuthError"),
                AuthError::InvalidCredentials => (StatusCode::BAD_REQUEST, "AuthError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "AuthError"),
            },
            ApiError::Config(err) => match err {
                ConfigError::ValidationError(_) => (StatusCode::BAD_REQUEST, "ConfigError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ConfigError"),
            },
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IoError"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "ConflictError"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "ForbiddenError"),
        };

        let error_message = match &self {
            ApiError::Team(TeamError::InviteCodeNotFound(code)) => {
                format!("Invalid invite code. No team found with code \"{code}\"")
            }
            ApiError::User(UserError::EmailTaken) => {
                "An account with this email already exists".to_string()
            }
            ApiError::Auth(AuthError::InvalidCredentials) => {
                "Incorrect email or password".to_string()
            }
            ApiError::Auth(AuthError::InvalidToken) => "Not authenticated".to_string(),
            ApiError::Unauthorized => "Not authenticated".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::Forbidden(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_expected_http_statuses() {
        assert_eq!(
            ApiError::BadRequest("bad".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("nope".to_string())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("missing".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("conflict".to_string())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_expected_http_statuses() {
        assert_eq!(
            ApiError::from(ChoreError::ChoreNotFound)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(UserError::EmailTaken).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TeamError::InviteCodeNotFound("ZZZZZZ".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidToken).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DbErr::RecordNotFound("gone".to_string()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }
}
