use std::time::Duration;

use crate::error::Result;
pub use clap::Parser;
use genres_app::state::AppConfig;
use genres_types::config::BackendConfig;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "REST server for genres")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "GENRES_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "GENRES_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "GENRES_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server, as visible to clients"
    )]
    pub base_url: Url,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "GENRES_TOKEN_VALIDITY",
        default_value = "1 day",
        help = "Default token validity in human friendly format (e.g. 1d, 1h, 1m, 1s - or combined)",
        value_parser = humantime::parse_duration
    )]
    pub token_validity: Duration,

    #[arg(
        long,
        env = "GENRES_DEFAULT_PAGE_SIZE",
        default_value = "100",
        value_parser = clap::value_parser!(u32).range(1..=1000),
        help = "Default page size"
    )]
    pub default_page_size: u32,

    #[arg(long, env = "GENRES_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn database_url(&self) -> String {
        self.backend.database_url()
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            default_page_size: config.default_page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        let config = ServerConfig::try_parse_from([
            "genres-server",
            "--port",
            "3333",
            "--data-dir",
            "/tmp/genres",
            "--token-validity",
            "1h 30m",
        ])
        .unwrap();
        assert_eq!(3333, config.port);
        assert_eq!("127.0.0.1", config.listen_address);
        assert_eq!(Duration::from_secs(5400), config.token_validity);
        assert_eq!("sqlite:///tmp/genres/genres.db", config.database_url());
        assert_eq!(100, AppConfig::from(&config).default_page_size);
    }

    #[test]
    fn test_invalid_page_size() {
        assert!(
            ServerConfig::try_parse_from(["genres-server", "--default-page-size", "0"]).is_err()
        );
    }
}
