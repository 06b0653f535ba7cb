use serde::{Deserialize, Serialize};

use crate::catalog::Gender;
use crate::generator::request::{DEFAULT_COUNT, DEFAULT_PASSWORD, DEFAULT_PREFIX, DEFAULT_START_INDEX};
use crate::generator::{BatchOutcome, GenerationForm, SynthesizedAccount};

/// `fromid`/`toid` query parameters; a missing or zero bound is open
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub fromid: i64,
    #[serde(default)]
    pub toid: i64,
}

impl RangeQuery {
    /// The page only shows a report when both ends are set
    pub fn is_set(&self) -> bool {
        self.fromid != 0 && self.toid != 0
    }

    /// Inclusive id range, each bound applied only when set
    pub fn bounds(&self) -> (i64, i64) {
        let min_id = if self.fromid != 0 { self.fromid } else { i64::MIN };
        let max_id = if self.toid != 0 { self.toid } else { i64::MAX };
        (min_id, max_id)
    }
}

/// JSON body for POST /api/generate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateRequest {
    #[serde(default = "default_prefix")]
    pub usernameprefix: String,
    #[serde(default = "default_index")]
    pub usernameindex: u64,
    #[serde(default = "default_count")]
    pub usercount: u32,
    #[serde(default = "default_password")]
    pub password: String,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_index() -> u64 {
    DEFAULT_START_INDEX
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

impl From<GenerateRequest> for GenerationForm {
    fn from(request: GenerateRequest) -> Self {
        GenerationForm {
            usercount: request.usercount.to_string(),
            usernameprefix: request.usernameprefix,
            usernameindex: request.usernameindex.to_string(),
            password: request.password,
        }
    }
}

/// One created account as returned by the JSON API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAccount {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub picture: String,
}

impl From<SynthesizedAccount> for GeneratedAccount {
    fn from(account: SynthesizedAccount) -> Self {
        Self {
            id: account.assigned_id,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            gender: account.gender,
            picture: account.picture.url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub fromid: i64,
    pub toid: i64,
    pub accounts: Vec<GeneratedAccount>,
}

impl From<BatchOutcome> for GenerateResponse {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            fromid: outcome.range.min_assigned_id,
            toid: outcome.range.max_assigned_id,
            accounts: outcome
                .accounts
                .into_values()
                .map(GeneratedAccount::from)
                .collect(),
        }
    }
}
