use serde::{Deserialize, Serialize};

/// Domain events published while generating accounts
///
/// Events represent facts about things that have already happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccountEvent {
    /// A new account has been persisted with its password and picture
    AccountCreated { account_id: i64, username: String },
}

impl AccountEvent {
    pub fn account_id(&self) -> i64 {
        match self {
            AccountEvent::AccountCreated { account_id, .. } => *account_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::AccountCreated { .. } => "account_created",
        }
    }
}
