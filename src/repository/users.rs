//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserRow},
};

use super::UserStore;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, password, role, borrowed_book_ids
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT username, password, role, borrowed_book_ids FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (username, password, role, borrowed_book_ids)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(&user.borrowed_book_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::UsernameTaken(user.username.clone())
            }
            other => AppError::Database(other),
        })?;

        Ok(())
    }

    async fn add_borrowed_book(&self, username: &str, book_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET borrowed_book_ids = array_append(borrowed_book_ids, $2)
            WHERE username = $1 AND NOT ($2 = ANY(borrowed_book_ids))
            "#,
        )
        .bind(username)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_borrowed_book(&self, username: &str, book_id: &str) -> AppResult<bool> {
        // array_remove would drop every match, slice around the first one
        let result = sqlx::query(
            r#"
            UPDATE users
            SET borrowed_book_ids =
                borrowed_book_ids[:array_position(borrowed_book_ids, $2) - 1]
                || borrowed_book_ids[array_position(borrowed_book_ids, $2) + 1:]
            WHERE username = $1 AND array_position(borrowed_book_ids, $2) IS NOT NULL
            "#,
        )
        .bind(username)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
