use clap::Args;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "genres";

#[derive(Debug, Clone, Args)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "GENRES_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db or similar, default is sqlite://[data-dir]/genres.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "GENRES_DATA_DIR",
        help = "Data directory (database, token secret), default is system default like ~/.local/share/genres"
    )]
    data_dir: Option<PathBuf>,
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|p| p.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME))
        })
    }

    /// Returns data directory, creating it if it does not exist yet
    pub fn ensure_data_dir(&self) -> std::io::Result<PathBuf> {
        let dir = self.data_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        } else if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("Data directory {} is not a directory", dir.display()),
            ));
        }
        Ok(dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}", self.data_dir().join("genres.db").display()))
    }
}
