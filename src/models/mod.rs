//! Data models for the library catalog

pub mod book;
pub mod user;

use validator::ValidationErrors;

// Re-export commonly used types
pub use book::{Book, BookUpdate, NewBook};
pub use user::{Credentials, Role, User, UserClaims};

/// Flatten validator output into one message per violated rule, following
/// `fields` order so responses are stable.
pub fn violation_messages(errors: &ValidationErrors, fields: &[&str]) -> Vec<String> {
    let by_field = errors.field_errors();
    fields
        .iter()
        .filter_map(|field| by_field.get(*field))
        .flat_map(|violations| violations.iter())
        .map(|violation| match &violation.message {
            Some(message) => message.to_string(),
            None => violation.code.to_string(),
        })
        .collect()
}
