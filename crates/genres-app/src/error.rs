use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::{header, StatusCode};
use serde_json::json;
use tracing::{debug, error};

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Data access error: {0}")]
    DataAccessError(genres_dal::Error),

    #[error("Token error: {0}")]
    TokenError(#[from] genres_auth::Error),
}

impl From<genres_dal::Error> for ApiError {
    fn from(value: genres_dal::Error) -> Self {
        match value {
            e if e.is_not_found() => ApiError::ResourceNotFound(e.to_string()),
            genres_dal::Error::InvalidOrderByField(field) => {
                ApiError::InvalidQuery(format!("Invalid sort field {field}"))
            }
            genres_dal::Error::InvalidCredentials => ApiError::Unauthorized,
            e => ApiError::DataAccessError(e),
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Json<serde_json::Value> {
    Json(json!({
        "status": status.as_u16(),
        "message": message,
    }))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ResourceNotFound(_) => {
                debug!("{self}");
                let status = StatusCode::NOT_FOUND;
                (status, error_body(status, "Not Found")).into_response()
            }
            ApiError::InvalidQuery(ref msg) => {
                debug!("{self}");
                let status = StatusCode::BAD_REQUEST;
                (status, error_body(status, msg)).into_response()
            }
            ApiError::Unauthorized => {
                let status = StatusCode::UNAUTHORIZED;
                (
                    status,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    error_body(status, "Unauthorized"),
                )
                    .into_response()
            }
            ApiError::DataAccessError(_) | ApiError::TokenError(_) => {
                error!("Internal error: {self}");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, error_body(status, "Internal Server Error")).into_response()
            }
        }
    }
}
