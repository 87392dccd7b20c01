//! Repository layer: typed access to the books and users collections
//!
//! Each store offers atomic updates of a single document only. Keeping a
//! book's `owned_by` and its borrowers' `borrowed_book_ids` in step is the
//! lending service's job, not the store's.

pub mod books;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, User},
};

/// Partial set of book columns to overwrite in one atomic update.
/// `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub amount: Option<i64>,
    pub owned_by: Option<Vec<String>>,
}

impl BookFields {
    /// The loan columns of `book`: amount and owned_by
    pub fn loans(book: &Book) -> Self {
        Self {
            amount: Some(book.amount),
            owned_by: Some(book.owned_by.clone()),
            ..Self::default()
        }
    }

    /// The admin-editable columns: title, author and amount
    pub fn details(title: &str, author: &str, amount: i64) -> Self {
        Self {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            amount: Some(amount),
            owned_by: None,
        }
    }

    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(amount) = self.amount {
            book.amount = amount;
        }
        if let Some(owned_by) = &self.owned_by {
            book.owned_by = owned_by.clone();
        }
    }
}

/// Loan state a guarded book update expects to find in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanGuard {
    pub amount: i64,
    pub owned_by: Vec<String>,
}

impl LoanGuard {
    pub fn of(book: &Book) -> Self {
        Self {
            amount: book.amount,
            owned_by: book.owned_by.clone(),
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.amount == book.amount && self.owned_by == book.owned_by
    }
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Book>>;

    /// Every book, ordered by id
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    /// Overwrite `fields` of one book. With a guard, the write only happens
    /// when the stored loan state still equals it. Returns whether a
    /// document was written.
    async fn update_fields(
        &self,
        id: &str,
        fields: &BookFields,
        guard: Option<&LoanGuard>,
    ) -> AppResult<bool>;

    /// Fails with `DuplicateId` when the id is taken
    async fn insert(&self, book: &Book) -> AppResult<()>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Check the store is reachable
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Every user, ordered by username
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Fails with `UsernameTaken` when the username is taken
    async fn insert(&self, user: &User) -> AppResult<()>;

    /// Append `book_id` to the user's borrowed list in one atomic update.
    /// Returns false when the user is missing or already lists the book.
    async fn add_borrowed_book(&self, username: &str, book_id: &str) -> AppResult<bool>;

    /// Drop the first `book_id` entry from the user's borrowed list in one
    /// atomic update. Returns false when there was nothing to drop.
    async fn remove_borrowed_book(&self, username: &str, book_id: &str) -> AppResult<bool>;
}

/// Main repository struct holding both collections
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }

    /// Create a repository that keeps everything in process memory
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(memory::MemoryBookStore::default()),
            users: Arc::new(memory::MemoryUserStore::default()),
        }
    }

    pub fn from_stores(books: Arc<dyn BookStore>, users: Arc<dyn UserStore>) -> Self {
        Self { books, users }
    }
}
