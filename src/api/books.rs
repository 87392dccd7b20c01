//! Catalog and lending endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::AuthenticatedUser;
use crate::{
    error::AppResult,
    models::{Book, BookUpdate, NewBook},
    AppState,
};

/// List every book
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books ordered by ID", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.lending.get_all().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.lending.get_by_id(&id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog (admin)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = NewBook,
    responses(
        (status = 201, description = "Book added", body = Book),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Book ID already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;

    let created = state.services.lending.add(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update title, author and amount of a book (admin)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = BookUpdate,
    responses(
        (status = 204, description = "Book updated"),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(update): Json<BookUpdate>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.lending.update(&id, update).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a book nobody holds (admin)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book is still borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.lending.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow a copy as the authenticated user
#[utoipa::path(
    patch,
    path = "/books/{id}/borrow",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book after the loan", body = Book),
        (status = 404, description = "Book or user not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book changed concurrently", body = crate::error::ErrorResponse),
        (status = 422, description = "Already borrowed or no copy left", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.lending.borrow(&id, &claims.sub).await?;
    Ok(Json(book))
}

/// Give back a copy held by the authenticated user
#[utoipa::path(
    patch,
    path = "/books/{id}/release",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book after the return", body = Book),
        (status = 404, description = "Book or user not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book changed concurrently", body = crate::error::ErrorResponse),
        (status = 422, description = "Book not borrowed by this user", body = crate::error::ErrorResponse)
    )
)]
pub async fn release_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.lending.release(&id, &claims.sub).await?;
    Ok(Json(book))
}
