use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Field name -> message, one entry per invalid form field
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid request: {}", describe(.0))]
    InvalidRequest(FieldErrors),

    #[error("These usernames are already taken: {}", .0.join(", "))]
    UsernameCollision(Vec<String>),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Failed to create account {username}: {reason}")]
    AccountCreationFailed { username: String, reason: String },

    #[error("Not allowed to create accounts")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl GenerationError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message.into());
        GenerationError::InvalidRequest(errors)
    }

    pub fn creation_failed(username: &str, reason: impl ToString) -> Self {
        GenerationError::AccountCreationFailed {
            username: username.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<CatalogError> for GenerationError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::DataUnavailable(msg) => GenerationError::DataUnavailable(msg),
        }
    }
}

fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}
