use crate::{ChosenDB, Error, ListingParams, error::Result};
use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::debug;

const VALID_ORDER_FIELDS: &[&str] = &["id", "name"];
const DEFAULT_ORDER_FIELD: &str = "id";
const ENTITY_NAME: &str = "Genre";

fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        Err(garde::Error::new("must not be blank"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateGenre {
    #[garde(custom(not_blank), length(chars, max = 255))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateGenre {
    #[garde(skip)]
    pub id: i64,
    #[garde(custom(not_blank), length(chars, max = 255))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

pub type GenreRepository = GenreRepositoryImpl<crate::Pool>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        let id = insert(&payload, &self.executor).await?;
        self.get(id).await
    }

    pub async fn update(&self, payload: UpdateGenre) -> Result<Genre> {
        let result = sqlx::query("UPDATE genre SET name = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(payload.id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            debug!("No genre with id {} to update", payload.id);
            Err(Error::RecordNotFound(ENTITY_NAME.to_string()))
        } else {
            self.get(payload.id).await
        }
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM genre")
            .fetch_one(&self.executor)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn list_all(&self) -> Result<Vec<Genre>> {
        self.list(ListingParams::default()).await
    }

    pub async fn list(&self, params: ListingParams) -> Result<Vec<Genre>> {
        let mut order = params.ordering(VALID_ORDER_FIELDS)?;
        // id as last criterion keeps pages stable for equal names
        let has_id = params
            .order
            .as_ref()
            .is_some_and(|o| o.iter().any(|o| o.as_ref() == DEFAULT_ORDER_FIELD));
        if !has_id {
            if !order.is_empty() {
                order.push_str(", ");
            }
            order.push_str(DEFAULT_ORDER_FIELD);
        }

        let records = sqlx::query_as::<_, Genre>(&format!(
            "SELECT id, name FROM genre ORDER BY {order} LIMIT ? OFFSET ?"
        ))
        .bind(params.limit)
        .bind(params.offset)
        .fetch(&self.executor)
        .take(crate::MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    /// Deleting non-existent genre is not an error
    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM genre WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            debug!("No genre with id {id} to delete");
        }
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::RecordNotFound(ENTITY_NAME.to_string()))
    }

    pub async fn find(&self, id: i64) -> Result<Option<Genre>> {
        find(id, &self.executor).await
    }
}

impl GenreRepositoryImpl<crate::Pool> {
    /// Inserts genre in a transaction and then aborts it, so nothing is persisted.
    /// Always ends with [`Error::TransactionAborted`] unless database fails earlier.
    pub async fn create_and_abort(&self, payload: CreateGenre) -> Result<Genre> {
        let mut transaction = self.executor.begin().await?;
        let id = insert(&payload, &mut *transaction).await?;
        let record = find(id, &mut *transaction).await?;
        debug!("Inserted {record:?} within transaction, rolling back");
        transaction.rollback().await?;
        Err(Error::TransactionAborted(id))
    }
}

async fn insert<'c, E>(payload: &CreateGenre, executor: E) -> Result<i64>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let result = sqlx::query("INSERT INTO genre (name) VALUES (?)")
        .bind(&payload.name)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

async fn find<'c, E>(id: i64, executor: E) -> Result<Option<Genre>>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let record = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        let genre = CreateGenre {
            name: "DevOps".to_string(),
        };
        assert!(genre.validate().is_ok());

        for name in ["", "   ", "\t\n"] {
            let genre = CreateGenre {
                name: name.to_string(),
            };
            assert!(genre.validate().is_err(), "{name:?} should be invalid");
        }

        let genre = UpdateGenre {
            id: 1,
            name: "x".repeat(256),
        };
        assert!(genre.validate().is_err());
    }

    #[test]
    fn test_name_length_in_characters() {
        let genre = CreateGenre {
            name: "Příběh".repeat(42) + "ží!",
        };
        assert_eq!(255, genre.name.chars().count());
        assert!(genre.name.len() > 255);
        assert!(genre.validate().is_ok());

        let genre = UpdateGenre {
            id: 1,
            name: "č".repeat(256),
        };
        assert!(genre.validate().is_err());
    }
}
