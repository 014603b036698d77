pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("User password error: {0}")]
    UserPasswordError(#[from] argon2::password_hash::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Transaction aborted after insert of record {0}")]
    TransactionAborted(i64),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::RecordNotFound(_) | Error::DatabaseError(sqlx::Error::RowNotFound)
        )
    }
}
