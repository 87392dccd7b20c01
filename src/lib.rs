//! Library Catalog
//!
//! A book catalog and lending server exposing a REST JSON API. Borrowing and
//! returning keep each book's borrowers and each user's borrowed books in
//! step without multi-document transactions.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
