use crate::{error::ApiResult, repository_from_request, state::AppState};
use axum::{extract::State, response::IntoResponse, routing::post, Json};
use axum_valid::Garde;
use garde::Validate;
use genres_dal::user::UserRepository;
use genres_types::claim::{ApiClaim, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod token;

repository_from_request!(UserRepository);

const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginCredentials {
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(length(min = 1, max = 255))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccessToken {
    pub username: String,
    pub roles: Vec<String>,
    pub access_token: String,
    pub token_type: String,
    /// Token validity in seconds
    pub expires_in: u64,
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/login", tag = "Auth", operation_id = "login",
    request_body = LoginCredentials,
    responses((status = 200, description = "Bearer token issued", body = AccessToken),
              (status = 401, description = "Invalid credentials"))))]
pub async fn login(
    State(state): State<AppState>,
    user_registry: UserRepository,
    Garde(Json(credentials)): Garde<Json<LoginCredentials>>,
) -> ApiResult<impl IntoResponse> {
    let user = user_registry
        .check_password(&credentials.username, &credentials.password)
        .await
        .inspect_err(|e| warn!("Login of {} failed: {e}", credentials.username))?;

    let roles = user.roles.unwrap_or_default();
    let claim = ApiClaim::new_expired(
        user.name.clone(),
        roles.iter().filter_map(|r| r.parse::<Role>().ok()),
    );
    let access_token = state.tokens().issue(claim)?;
    debug!("Issued token for user {}", user.name);

    Ok(Json(AccessToken {
        username: user.name,
        roles,
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.tokens().default_validity().as_secs(),
    }))
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(login))]
struct ModuleDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    ModuleDocs::openapi()
}

/// Public routes, token is obtained here
pub fn auth_router() -> axum::Router<AppState> {
    axum::Router::new().route("/login", post(login))
}
