use std::path::Path;

use crate::config::ServerConfig;
use crate::error::Result;
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use futures::FutureExt;
use genres_app::auth::auth_router;
use genres_app::state::{AppConfig, AppState};
use tokio::{fs, io::AsyncWriteExt as _};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const SECRET_FILE: &str = "secret";
const SECRET_LENGTH: usize = 32;

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Listening on {}, base URL {}",
        listener.local_addr()?,
        args.base_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::openapi::Components;

    #[derive(utoipa::OpenApi)]
    #[openapi(modifiers(&SecurityAddon), security(("bearer" = [])))]
    struct OpenApi;

    struct SecurityAddon;

    impl utoipa::Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

            openapi
                .components
                .get_or_insert_with(Components::new)
                .add_security_scheme(
                    "bearer",
                    SecurityScheme::Http(
                        HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                    ),
                );
        }
    }

    use utoipa::OpenApi as _;
    OpenApi::openapi()
        .nest("/genres", genres_app::rest_api::genre::api_docs())
        .merge_from(genres_app::auth::api_docs())
}

pub fn main_router(state: AppState) -> Router<()> {
    #[allow(unused_mut)]
    let mut router = Router::new()
        // genre routes are protected by token
        .nest("/genres", genres_app::rest_api::genre::router(state.clone()))
        .merge(auth_router())
        .with_state(state)
        .route("/health", get(health));

    #[cfg(feature = "openapi")]
    {
        let docs = api_docs();
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs),
        );
    }
    router.layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.backend.ensure_data_dir()?;
    let app_config: AppConfig = config.into();

    let pool = genres_dal::new_pool(&config.database_url()).await?;
    genres_dal::migrate(&pool).await?;

    let secret = read_secret(&data_dir).await?;
    let tokens = genres_auth::token::TokenManager::new(&secret, config.token_validity);
    Ok(AppState::new(app_config, pool, tokens))
}

async fn read_secret(data_dir: &Path) -> Result<Vec<u8>, std::io::Error> {
    let secret_file = data_dir.join(SECRET_FILE);

    let secret = if fs::try_exists(&secret_file).await? {
        debug!("Reading token secret from {}", secret_file.display());
        fs::read(&secret_file).await?
    } else {
        info!("Generating new token secret in {}", secret_file.display());
        let random_bytes = rand::random::<[u8; SECRET_LENGTH]>();
        #[cfg(unix)]
        let mut file = {
            use std::fs::OpenOptions;
            use std::os::unix::fs::OpenOptionsExt;
            {
                // Make sure the file is only accessible by the current user
                let _f = OpenOptions::new()
                    .mode(0o600)
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&secret_file)?;
            }
            fs::File::options().write(true).open(&secret_file).await?
        };
        #[cfg(not(unix))]
        let mut file = fs::File::create(&secret_file).await?;

        file.write_all(&random_bytes).await?;
        random_bytes.as_ref().to_vec()
    };
    if secret.len() < SECRET_LENGTH {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Token secret in {} is too short", secret_file.display()),
        ));
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_secret_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let secret = read_secret(dir.path()).await.unwrap();
        assert_eq!(SECRET_LENGTH, secret.len());
        let again = read_secret(dir.path()).await.unwrap();
        assert_eq!(secret, again);
    }

    #[tokio::test]
    async fn test_short_secret_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SECRET_FILE), b"short").await.unwrap();
        assert!(read_secret(dir.path()).await.is_err());
    }
}
