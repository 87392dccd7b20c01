//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::Book,
};

use super::{BookFields, BookStore, LoanGuard};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    /// Get book by ID
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, amount, owned_by FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, amount, owned_by FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Single-statement update. The guard turns it into a compare-and-set on
    /// the loan columns.
    async fn update_fields(
        &self,
        id: &str,
        fields: &BookFields,
        guard: Option<&LoanGuard>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                amount = COALESCE($4, amount),
                owned_by = COALESCE($5, owned_by)
            WHERE id = $1
              AND ($6::BIGINT IS NULL OR amount = $6)
              AND ($7::TEXT[] IS NULL OR owned_by = $7)
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(fields.amount)
        .bind(&fields.owned_by)
        .bind(guard.map(|g| g.amount))
        .bind(guard.map(|g| g.owned_by.clone()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert(&self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, amount, owned_by)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.amount)
        .bind(&book.owned_by)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::DuplicateId(book.id.clone())
            }
            other => AppError::Database(other),
        })?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
