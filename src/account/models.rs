use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authentication method recorded on generated accounts
pub const MANUAL_AUTH: &str = "manual";

/// Database model for the accounts table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct AccountModel {
    pub id: i64, // Assigned by the store, never changes
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub confirmed: bool,
    pub auth: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub picture: Option<String>, // Draft key of the applied profile picture
    pub created_at: DateTime<Utc>,
}

impl AccountModel {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields handed to the store when creating an account
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub confirmed: bool,
    pub auth: String,
}

impl NewAccount {
    /// A confirmed, manually-authenticated account
    pub fn manual(username: String, first_name: String, last_name: String, email: String) -> Self {
        Self {
            username,
            first_name,
            last_name,
            email,
            confirmed: true,
            auth: MANUAL_AUTH.to_string(),
        }
    }
}

/// Lookup criteria for existence checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    Email(String),
    Username(String),
}
