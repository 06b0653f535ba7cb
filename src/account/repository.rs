use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{AccountFilter, AccountModel, NewAccount};
use super::password::hash_password;
use crate::shared::AppError;
use crate::staging::StagingRef;

/// Trait for account store operations
///
/// The store assigns ids, owns password hashing and is the source of truth
/// for username and email uniqueness checks.
#[async_trait]
pub trait AccountRepository {
    /// Persists a new account and returns its assigned id.
    /// Fails with `AppError::Conflict` when the username is taken.
    async fn create_account(&self, account: &NewAccount) -> Result<i64, AppError>;
    async fn set_password(&self, account_id: i64, plaintext: &str) -> Result<(), AppError>;
    async fn apply_profile_picture(
        &self,
        account_id: i64,
        staging_ref: &StagingRef,
    ) -> Result<(), AppError>;
    async fn account_exists(&self, filter: &AccountFilter) -> Result<bool, AppError>;
    /// Returns those of `usernames` that are already taken, in input order
    async fn find_existing_usernames(&self, usernames: &[String])
        -> Result<Vec<String>, AppError>;
    /// Accounts with `min_id <= id <= max_id`, ordered by username
    async fn query_by_id_range(
        &self,
        min_id: i64,
        max_id: i64,
    ) -> Result<Vec<AccountModel>, AppError>;
    async fn get_account(&self, account_id: i64) -> Result<Option<AccountModel>, AppError>;
}

struct InMemoryState {
    accounts: BTreeMap<i64, AccountModel>,
    next_id: i64,
}

/// In-memory implementation of AccountRepository for development and testing
///
/// Ids are handed out sequentially starting at 1. Data is lost when the
/// process exits.
pub struct InMemoryAccountRepository {
    state: Mutex<InMemoryState>,
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                accounts: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Creates a repository whose first assigned id is `first_id`
    pub fn starting_at(first_id: i64) -> Self {
        let repo = Self::new();
        repo.state.lock().unwrap().next_id = first_id;
        repo
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    pub fn all_accounts(&self) -> Vec<AccountModel> {
        self.state.lock().unwrap().accounts.values().cloned().collect()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip(self, account), fields(username = %account.username))]
    async fn create_account(&self, account: &NewAccount) -> Result<i64, AppError> {
        let mut state = self.state.lock().unwrap();
        if state
            .accounts
            .values()
            .any(|existing| existing.username == account.username)
        {
            warn!(username = %account.username, "Username already exists in memory");
            return Err(AppError::Conflict(format!(
                "username {} already exists",
                account.username
            )));
        }

        let id = state.next_id;
        state.next_id += 1;
        state.accounts.insert(
            id,
            AccountModel {
                id,
                username: account.username.clone(),
                first_name: account.first_name.clone(),
                last_name: account.last_name.clone(),
                email: account.email.clone(),
                confirmed: account.confirmed,
                auth: account.auth.clone(),
                password_hash: None,
                picture: None,
                created_at: Utc::now(),
            },
        );

        debug!(account_id = id, "Account created in memory");
        Ok(id)
    }

    #[instrument(skip(self, plaintext))]
    async fn set_password(&self, account_id: i64, plaintext: &str) -> Result<(), AppError> {
        let hash = hash_password(plaintext);
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| AppError::NotFound(format!("account {} not found", account_id)))?;
        account.password_hash = Some(hash);
        Ok(())
    }

    #[instrument(skip(self, staging_ref))]
    async fn apply_profile_picture(
        &self,
        account_id: i64,
        staging_ref: &StagingRef,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| AppError::NotFound(format!("account {} not found", account_id)))?;
        account.picture = Some(staging_ref.draft_key());
        debug!(account_id, item_id = %staging_ref.item_id, "Profile picture applied");
        Ok(())
    }

    async fn account_exists(&self, filter: &AccountFilter) -> Result<bool, AppError> {
        let state = self.state.lock().unwrap();
        let exists = state.accounts.values().any(|account| match filter {
            AccountFilter::Email(email) => &account.email == email,
            AccountFilter::Username(username) => &account.username == username,
        });
        Ok(exists)
    }

    async fn find_existing_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<String>, AppError> {
        let state = self.state.lock().unwrap();
        let taken: HashSet<&str> = state
            .accounts
            .values()
            .map(|account| account.username.as_str())
            .collect();
        Ok(usernames
            .iter()
            .filter(|username| taken.contains(username.as_str()))
            .cloned()
            .collect())
    }

    async fn query_by_id_range(
        &self,
        min_id: i64,
        max_id: i64,
    ) -> Result<Vec<AccountModel>, AppError> {
        if min_id > max_id {
            return Ok(Vec::new());
        }
        let state = self.state.lock().unwrap();
        let mut accounts: Vec<AccountModel> = state
            .accounts
            .range(min_id..=max_id)
            .map(|(_, account)| account.clone())
            .collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }

    async fn get_account(&self, account_id: i64) -> Result<Option<AccountModel>, AppError> {
        Ok(self.state.lock().unwrap().accounts.get(&account_id).cloned())
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, username, first_name, last_name, email, confirmed, auth, password_hash, picture, created_at";

/// PostgreSQL implementation of the account repository
///
/// The schema lives in `migrations/`; call `run_migrations` before first use.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded `migrations/` directory; already-applied steps are skipped
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to apply database migrations");
                AppError::DatabaseError(e.to_string())
            })?;
        debug!("Database migrations applied");
        Ok(())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .is_some_and(|code| code == "23505")
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[instrument(skip(self, account), fields(username = %account.username))]
    async fn create_account(&self, account: &NewAccount) -> Result<i64, AppError> {
        let row = sqlx::query(
            "INSERT INTO accounts (username, first_name, last_name, email, confirmed, auth, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&account.username)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(account.confirmed)
        .bind(&account.auth)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(username = %account.username, "Username already exists in database");
                AppError::Conflict(format!("username {} already exists", account.username))
            } else {
                warn!(error = %e, "Failed to create account in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        let id: i64 = row.get("id");
        debug!(account_id = id, "Account created in database");
        Ok(id)
    }

    #[instrument(skip(self, plaintext))]
    async fn set_password(&self, account_id: i64, plaintext: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
            .bind(account_id)
            .bind(hash_password(plaintext))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, account_id, "Failed to set password");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("account {} not found", account_id)));
        }
        Ok(())
    }

    #[instrument(skip(self, staging_ref))]
    async fn apply_profile_picture(
        &self,
        account_id: i64,
        staging_ref: &StagingRef,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE accounts SET picture = $2 WHERE id = $1")
            .bind(account_id)
            .bind(staging_ref.draft_key())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, account_id, "Failed to apply profile picture");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("account {} not found", account_id)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn account_exists(&self, filter: &AccountFilter) -> Result<bool, AppError> {
        let (sql, value) = match filter {
            AccountFilter::Email(email) => {
                ("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)", email)
            }
            AccountFilter::Username(username) => (
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)",
                username,
            ),
        };

        let exists: bool = sqlx::query_scalar(sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to check account existence");
                AppError::DatabaseError(e.to_string())
            })?;
        Ok(exists)
    }

    #[instrument(skip(self, usernames), fields(count = usernames.len()))]
    async fn find_existing_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<String>, AppError> {
        let taken: Vec<String> =
            sqlx::query_scalar("SELECT username FROM accounts WHERE username = ANY($1)")
                .bind(usernames.to_vec())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to look up existing usernames");
                    AppError::DatabaseError(e.to_string())
                })?;

        let taken: HashSet<String> = taken.into_iter().collect();
        Ok(usernames
            .iter()
            .filter(|username| taken.contains(*username))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn query_by_id_range(
        &self,
        min_id: i64,
        max_id: i64,
    ) -> Result<Vec<AccountModel>, AppError> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE id >= $1 AND id <= $2 ORDER BY username ASC",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, AccountModel>(&sql)
            .bind(min_id)
            .bind(max_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to query accounts by id range");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn get_account(&self, account_id: i64) -> Result<Option<AccountModel>, AppError> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, AccountModel>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, account_id, "Failed to fetch account");
                AppError::DatabaseError(e.to_string())
            })
    }
}
