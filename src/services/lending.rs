//! Lending service: the catalog operations that keep books and users in step
//!
//! A loan is recorded twice, in the book's `owned_by` and in the borrower's
//! `borrowed_book_ids`. The store can only update one document atomically,
//! so borrow and release write the book first and the user second.

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{self, Book, BookUpdate, NewBook},
        User,
    },
    repository::{BookFields, LoanGuard, Repository},
};

/// Which way a loan moves on the user side
#[derive(Debug, Clone, Copy)]
enum LoanChange {
    Lend,
    Return,
}

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a book by ID
    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookNotFound(id.to_string()))
    }

    /// Get every book in the catalog, ordered by ID
    pub async fn get_all(&self) -> AppResult<Vec<Book>> {
        self.repository.books.find_all().await
    }

    /// Lend one copy of a book to a user
    pub async fn borrow(&self, book_id: &str, username: &str) -> AppResult<Book> {
        let mut book = self.get_by_id(book_id).await?;
        let user = self.find_user(username).await?;

        if user.borrowed_book_ids.iter().any(|id| id == book_id) {
            return Err(AppError::AlreadyHave(book.title));
        }
        if book.amount <= 0 {
            return Err(AppError::AmountIsZero(book.title));
        }

        let guard = LoanGuard::of(&book);
        book.amount -= 1;
        book.owned_by.push(user.username.clone());

        self.write_loan(&book, &guard, &user.username, LoanChange::Lend).await?;

        tracing::info!(book_id = %book.id, username = %user.username, amount = book.amount, "Book borrowed");
        Ok(book)
    }

    /// Take back a copy the user holds
    pub async fn release(&self, book_id: &str, username: &str) -> AppResult<Book> {
        let mut book = self.get_by_id(book_id).await?;
        let user = self.find_user(username).await?;

        if !user.borrowed_book_ids.iter().any(|id| id == book_id) {
            return Err(AppError::NotBorrowed(book.title));
        }

        let guard = LoanGuard::of(&book);
        if let Some(owner) = book.owned_by.iter().position(|name| *name == user.username) {
            book.owned_by.remove(owner);
        }
        book.amount += 1;

        self.write_loan(&book, &guard, &user.username, LoanChange::Return).await?;

        tracing::info!(book_id = %book.id, username = %user.username, amount = book.amount, "Book released");
        Ok(book)
    }

    /// Add a new book to the catalog
    pub async fn add(&self, new_book: NewBook) -> AppResult<Book> {
        if self.repository.books.find_by_id(&new_book.id).await?.is_some() {
            return Err(AppError::DuplicateId(new_book.id));
        }
        book::validate_for_addition(&new_book)?;

        let book = Book::from(new_book);
        self.repository.books.insert(&book).await?;

        tracing::info!(book_id = %book.id, amount = book.amount, "Book added");
        Ok(book)
    }

    /// Overwrite title, author and amount. Loans are left as they are.
    pub async fn update(&self, id: &str, update: BookUpdate) -> AppResult<()> {
        self.get_by_id(id).await?;
        book::validate_for_update(&update)?;

        let fields = BookFields::details(&update.title, &update.author, update.amount);
        if !self.repository.books.update_fields(id, &fields, None).await? {
            // Deleted between the lookup and the write
            return Err(AppError::BookNotFound(id.to_string()));
        }

        tracing::info!(book_id = %id, "Book updated");
        Ok(())
    }

    /// Remove a book nobody holds
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let book = self.get_by_id(id).await?;
        if !book.owned_by.is_empty() {
            return Err(AppError::StillBorrowed(book.title));
        }

        self.repository.books.delete(id).await?;

        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    /// Check the book store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }

    async fn find_user(&self, username: &str) -> AppResult<User> {
        self.repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Persist both halves of a loan change, book first.
    ///
    /// The book write only applies if its loan state is still `guard`. The
    /// user side is a single-entry add or remove, so concurrent loans of one
    /// user on other books are kept. A user write failing after the book
    /// write leaves the book updated; nothing is undone.
    async fn write_loan(
        &self,
        book: &Book,
        guard: &LoanGuard,
        username: &str,
        change: LoanChange,
    ) -> AppResult<()> {
        let applied = self
            .repository
            .books
            .update_fields(&book.id, &BookFields::loans(book), Some(guard))
            .await?;
        if !applied {
            tracing::warn!(book_id = %book.id, username, "Stale loan state, book not written");
            return Err(AppError::ConcurrentModification(book.id.clone()));
        }

        let users = &self.repository.users;
        let result = match change {
            LoanChange::Lend => users.add_borrowed_book(username, &book.id).await,
            LoanChange::Return => users.remove_borrowed_book(username, &book.id).await,
        };
        let error = match result {
            Ok(true) => return Ok(()),
            // The user's list moved on since it was read
            Ok(false) => AppError::ConcurrentModification(book.id.clone()),
            Err(e) => e,
        };

        tracing::error!(
            book_id = %book.id,
            username,
            ?change,
            error = %error,
            "Book written but user write failed, loan recorded on one side only"
        );
        Err(error)
    }
}
