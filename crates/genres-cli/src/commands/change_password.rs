use clap::Args;
use garde::Validate;
use genres_types::config::BackendConfig;

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug, Validate)]
pub struct ChangePasswordCmd {
    #[command(flatten)]
    #[garde(skip)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name")]
    #[garde(skip)]
    pub name: String,
    #[arg(short, long, help = "New user password, at least 8 characters")]
    #[garde(length(min = 8, max = 255))]
    pub password: String,
}

impl Executor for ChangePasswordCmd {
    async fn run(self) -> anyhow::Result<()> {
        self.validate()?;
        let repository = create_user_repository(&self.backend).await?;
        repository
            .change_password(&self.name, &self.password)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use crate::{commands::Executor as _, config::CliConfig};

    fn change_password(data_dir: &str, password: &str) -> CliConfig {
        CliConfig::try_parse_from([
            "genres-cli",
            "change-password",
            "--data-dir",
            data_dir,
            "--name",
            "sherlock",
            "--password",
            password,
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_change_password() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        let config = CliConfig::try_parse_from([
            "genres-cli",
            "create-user",
            "--data-dir",
            &data_dir,
            "--name",
            "sherlock",
            "--password",
            "password",
        ])
        .unwrap();
        config.command.run().await.unwrap();

        let too_long = "x".repeat(256);
        for invalid in ["short", too_long.as_str()] {
            let config = change_password(&data_dir, invalid);
            assert!(config.command.run().await.is_err());
        }

        let config = change_password(&data_dir, "new password");
        config.command.run().await.unwrap();

        let pool = genres_dal::new_pool(&format!("sqlite://{data_dir}/genres.db"))
            .await
            .unwrap();
        let repository = genres_dal::user::UserRepository::new(pool);
        assert!(repository
            .check_password("sherlock", "password")
            .await
            .is_err());
        repository
            .check_password("sherlock", "new password")
            .await
            .unwrap();
    }
}
