use clap::Args;
use genres_types::config::BackendConfig;

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug)]
pub struct ListUsersCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, default_value_t = 100, help = "Maximum number of users listed")]
    pub limit: usize,
}

impl Executor for ListUsersCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = create_user_repository(&self.backend).await?;
        for user in repository.list(self.limit).await? {
            let roles = user.roles.unwrap_or_default().join(",");
            println!("{}\t{}\t{}", user.id, user.name, roles);
        }
        Ok(())
    }
}
