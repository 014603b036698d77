use std::{path::Path, time::Duration};

use anyhow::{Result, anyhow};
use genres_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::{
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::json;
use tempfile::TempDir;
use tracing::{debug, info};

pub mod rest;

pub const TEST_USER: &str = "sherlock";
pub const TEST_PASSWORD: &str = "password";

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let base_url = format!("http://localhost:{}/", port);
    let args = &[
        "genres-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Prepares fresh data directory with migrated database
pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    let (args, guard) = test_config(test_name, &base_dir)?;
    args.backend.ensure_data_dir()?;
    let pool = genres_dal::new_pool(&args.database_url()).await?;
    genres_dal::migrate(&pool).await?;
    pool.close().await;
    debug!("Prepared test environment in {:?}", args.backend.data_dir());
    Ok((args, guard))
}

pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let health_url = args.base_url.join("health")?;
    tokio::spawn(async move {
        if let Err(e) = genres_server::run::run(args).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    Err(anyhow!("Server did not start in time"))
}

pub async fn create_test_user(args: &ServerConfig) -> Result<()> {
    let pool = genres_dal::new_pool(&args.database_url()).await?;
    let users = genres_dal::user::UserRepository::new(pool);
    users
        .create(genres_dal::user::CreateUser {
            name: TEST_USER.to_string(),
            password: TEST_PASSWORD.to_string(),
            roles: Some(vec!["user".to_string()]),
        })
        .await?;
    Ok(())
}

pub async fn login(base_url: &Url, user: &str, password: &str) -> Result<String> {
    let response = reqwest::Client::new()
        .post(base_url.join("login")?)
        .json(&json!({"username": user, "password": password}))
        .send()
        .await?
        .error_for_status()?;
    let body: serde_json::Value = response.json().await?;
    body["access_token"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("Missing access token in login response"))
}

/// Creates test user, starts server and returns client authorized by bearer token
pub async fn launch_env(args: ServerConfig) -> Result<(reqwest::Client, String)> {
    create_test_user(&args).await?;
    let base_url = args.base_url.clone();
    spawn_server(args).await?;
    let token = login(&base_url, TEST_USER, TEST_PASSWORD).await?;
    info!("Logged in as {TEST_USER}");

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))?,
    );
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;
    Ok((client, token))
}

pub fn extend_url(base_url: &Url, path: impl AsRef<str>) -> Result<Url> {
    Ok(base_url.join(path.as_ref().trim_start_matches('/'))?)
}
