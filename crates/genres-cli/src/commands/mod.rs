use genres_dal::user::UserRepository;
use genres_types::config::BackendConfig;

pub mod change_password;
pub mod create_user;
pub mod list_users;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

pub(crate) async fn create_user_repository(
    backend: &BackendConfig,
) -> anyhow::Result<UserRepository> {
    backend.ensure_data_dir()?;
    let pool = genres_dal::new_pool(&backend.database_url()).await?;
    genres_dal::migrate(&pool).await?;
    Ok(UserRepository::new(pool))
}
