//! Book model, admin payloads and the rules they must satisfy

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};

use super::violation_messages;

/// Field order used when reporting violations
const BOOK_FIELDS: [&str; 5] = ["id", "title", "author", "amount", "owned_by"];

/// A catalog entry. `amount` counts the copies still on the shelf and
/// `owned_by` holds one username per outstanding loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub amount: i64,
    pub owned_by: Vec<String>,
}

/// Add book request (admin)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct NewBook {
    #[validate(length(min = 1, message = "book id is empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "title is empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is empty"))]
    pub author: String,
    #[validate(range(min = 1, message = "amount is less than or equal to zero"))]
    pub amount: i64,
    /// Must be absent or empty: loans cannot be seeded
    pub owned_by: Option<Vec<String>>,
}

/// Update book request (admin). The id travels in the path, never here.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookUpdate {
    pub id: Option<String>,
    #[validate(length(min = 1, message = "title is empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is empty"))]
    pub author: String,
    #[validate(range(min = 1, message = "amount is less than or equal to zero"))]
    pub amount: i64,
    pub owned_by: Option<Vec<String>>,
}

impl From<NewBook> for Book {
    fn from(book: NewBook) -> Self {
        Book {
            id: book.id,
            title: book.title,
            author: book.author,
            amount: book.amount,
            owned_by: Vec::new(),
        }
    }
}

/// Check a book payload before it is inserted.
pub fn validate_for_addition(book: &NewBook) -> AppResult<()> {
    let mut errors = book.validate().err().unwrap_or_default();

    if has_loans(&book.owned_by) {
        errors.add("owned_by", violation("cannot add book with non empty owned_by"));
    }

    into_result(errors)
}

/// Check a book payload before it overwrites an existing book.
pub fn validate_for_update(book: &BookUpdate) -> AppResult<()> {
    let mut errors = book.validate().err().unwrap_or_default();

    if book.id.as_deref().is_some_and(|id| !id.is_empty()) {
        errors.add("id", violation("book id is not empty"));
    }
    if has_loans(&book.owned_by) {
        errors.add("owned_by", violation("cannot edit book owned_by"));
    }

    into_result(errors)
}

fn has_loans(owned_by: &Option<Vec<String>>) -> bool {
    owned_by.as_ref().is_some_and(|owners| !owners.is_empty())
}

fn violation(message: &'static str) -> ValidationError {
    ValidationError::new("invalid").with_message(message.into())
}

fn into_result(errors: ValidationErrors) -> AppResult<()> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violation_messages(&errors, &BOOK_FIELDS)))
    }
}
