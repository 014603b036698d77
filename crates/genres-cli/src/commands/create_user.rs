use clap::Args;
use garde::Validate as _;
use genres_types::{claim::Role, config::BackendConfig};
use tracing::info;

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name, used as login")]
    pub name: String,
    #[arg(short, long, help = "User password, at least 8 characters")]
    pub password: String,
    #[arg(short, long, num_args=0..,
        value_delimiter = ',', help = "Roles of the user, comma separated or used multiple times")]
    pub roles: Vec<Role>,
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        let roles: Vec<String> = self.roles.iter().map(|r| r.to_string()).collect();
        let new_user = genres_dal::user::CreateUser {
            name: self.name,
            password: self.password,
            roles: if roles.is_empty() { None } else { Some(roles) },
        };
        new_user.validate()?;

        let repository = create_user_repository(&self.backend).await?;
        let user = repository.create(new_user).await?;
        info!("Created user {} with id {}", user.name, user.id);

        Ok(())
    }
}
