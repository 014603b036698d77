use clap::{Parser, Subcommand};

use crate::commands::{
    change_password::ChangePasswordCmd, create_user::CreateUserCmd, list_users::ListUsersCmd,
};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for genres server - manages user accounts allowed to use the API."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    CreateUser(CreateUserCmd),
    ChangePassword(ChangePasswordCmd),
    ListUsers(ListUsersCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::CreateUser(cmd) => cmd.run().await,
            Command::ChangePassword(cmd) => cmd.run().await,
            Command::ListUsers(cmd) => cmd.run().await,
        }
    }
}
