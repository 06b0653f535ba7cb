// Public API - what other modules can use
pub use models::{AccountFilter, AccountModel, NewAccount};
pub use repository::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};

pub mod models;
pub mod password;
pub mod repository;
