use serde::{Deserialize, Serialize};

use super::errors::{FieldErrors, GenerationError};

pub const DEFAULT_COUNT: u32 = 10;
pub const DEFAULT_PREFIX: &str = "user";
pub const DEFAULT_START_INDEX: u64 = 1;
pub const DEFAULT_PASSWORD: &str = "test";

/// Raw generation form as submitted; every field is text until validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationForm {
    #[serde(default)]
    pub usercount: String,
    #[serde(default)]
    pub usernameprefix: String,
    #[serde(default)]
    pub usernameindex: String,
    #[serde(default)]
    pub password: String,
}

impl Default for GenerationForm {
    fn default() -> Self {
        Self {
            usercount: DEFAULT_COUNT.to_string(),
            usernameprefix: DEFAULT_PREFIX.to_string(),
            usernameindex: DEFAULT_START_INDEX.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// A validated request to generate `count` accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub username_prefix: String,
    pub start_index: u64,
    pub count: u32,
    pub password: String,
}

impl GenerationRequest {
    pub fn new(
        username_prefix: impl Into<String>,
        start_index: u64,
        count: u32,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username_prefix: username_prefix.into(),
            start_index,
            count,
            password: password.into(),
        }
    }

    pub fn usernames(&self) -> Vec<String> {
        usernames_for(&self.username_prefix, self.start_index, self.count)
    }
}

/// `prefix + (start + i)` for i in `0..count`
pub fn usernames_for(prefix: &str, start_index: u64, count: u32) -> Vec<String> {
    (0..u64::from(count))
        .map(|i| format!("{}{}", prefix, start_index + i))
        .collect()
}

/// Characters the platform accepts in usernames
fn is_username_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '@')
}

impl GenerationForm {
    /// Field-level validation; all problems are reported together
    pub fn validate(&self, max_batch_size: u32) -> Result<GenerationRequest, GenerationError> {
        let mut errors = FieldErrors::new();

        let count = match self.usercount.trim().parse::<u32>() {
            Ok(0) => {
                errors.insert("usercount", "Must be at least 1".to_string());
                None
            }
            Ok(n) if n > max_batch_size => {
                errors.insert(
                    "usercount",
                    format!("At most {} users can be generated at once", max_batch_size),
                );
                None
            }
            Ok(n) => Some(n),
            Err(_) => {
                errors.insert("usercount", "You must enter a number here".to_string());
                None
            }
        };

        let start_index = match self.usernameindex.trim().parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.insert(
                    "usernameindex",
                    "You must enter a non-negative number here".to_string(),
                );
                None
            }
        };

        if let (Some(start), Some(count)) = (start_index, count) {
            if start.checked_add(u64::from(count)).is_none() {
                errors.insert("usernameindex", "Index is too large".to_string());
            }
        }

        let prefix = self.usernameprefix.trim();
        if prefix.is_empty() {
            errors.insert("usernameprefix", "Required".to_string());
        } else if !prefix.chars().all(is_username_char) {
            errors.insert(
                "usernameprefix",
                "Only lowercase letters, digits and _ - . @ are allowed".to_string(),
            );
        }

        if self.password.is_empty() {
            errors.insert("password", "Required".to_string());
        }

        match (start_index, count) {
            (Some(start_index), Some(count)) if errors.is_empty() => Ok(GenerationRequest {
                username_prefix: prefix.to_string(),
                start_index,
                count,
                password: self.password.clone(),
            }),
            _ => Err(GenerationError::InvalidRequest(errors)),
        }
    }
}
