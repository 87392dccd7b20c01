//! In-process stores, used by the `memory` backend and by tests

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Book, User},
};

use super::{BookFields, BookStore, LoanGuard, UserStore};

#[derive(Clone, Default)]
pub struct MemoryBookStore {
    books: Arc<RwLock<BTreeMap<String, Book>>>,
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Book>> {
        Ok(self.books.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn update_fields(
        &self,
        id: &str,
        fields: &BookFields,
        guard: Option<&LoanGuard>,
    ) -> AppResult<bool> {
        let mut books = self.books.write().await;
        let Some(book) = books.get_mut(id) else {
            return Ok(false);
        };
        if guard.is_some_and(|guard| !guard.matches(book)) {
            return Ok(false);
        }
        fields.apply_to(book);
        Ok(true)
    }

    async fn insert(&self, book: &Book) -> AppResult<()> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.id) {
            return Err(AppError::DuplicateId(book.id.clone()));
        }
        books.insert(book.id.clone(), book.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.books.write().await.remove(id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<BTreeMap<String, User>>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(AppError::UsernameTaken(user.username.clone()));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn add_borrowed_book(&self, username: &str, book_id: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(username) else {
            return Ok(false);
        };
        if user.borrowed_book_ids.iter().any(|id| id == book_id) {
            return Ok(false);
        }
        user.borrowed_book_ids.push(book_id.to_string());
        Ok(true)
    }

    async fn remove_borrowed_book(&self, username: &str, book_id: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(username) else {
            return Ok(false);
        };
        match user.borrowed_book_ids.iter().position(|id| id == book_id) {
            Some(position) => {
                user.borrowed_book_ids.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
