use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use super::errors::GenerationError;
use super::request::GenerationRequest;
use super::synthesizer::{SynthesizedAccount, UserSynthesizer};

/// Id range of one batch; a lookup token, ids in between may belong to others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub min_assigned_id: i64,
    pub max_assigned_id: i64,
}

impl BatchResult {
    pub fn contains(&self, id: i64) -> bool {
        self.min_assigned_id <= id && id <= self.max_assigned_id
    }
}

/// Range plus every account created in the batch, keyed by assigned id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub range: BatchResult,
    pub accounts: BTreeMap<i64, SynthesizedAccount>,
}

/// Runs the synthesizer over the usernames of a request, one at a time
///
/// Accounts are created sequentially: each email lookup must observe the
/// accounts created before it. A failure stops the batch; accounts already
/// created stay in the store.
pub struct BatchGenerator {
    synthesizer: UserSynthesizer,
}

impl BatchGenerator {
    pub fn new(synthesizer: UserSynthesizer) -> Self {
        Self { synthesizer }
    }

    #[instrument(skip(self, request), fields(prefix = %request.username_prefix, start = request.start_index, count = request.count))]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<BatchOutcome, GenerationError> {
        if request.count == 0 {
            return Err(GenerationError::invalid("usercount", "Must be at least 1"));
        }
        if request
            .start_index
            .checked_add(u64::from(request.count))
            .is_none()
        {
            return Err(GenerationError::invalid("usernameindex", "Index is too large"));
        }

        let mut accounts = BTreeMap::new();
        for username in request.usernames() {
            let account = self
                .synthesizer
                .synthesize(&username, &request.password)
                .await?;
            accounts.insert(account.assigned_id, account);
        }

        // count > 0, so both ends exist
        let (Some(&min_assigned_id), Some(&max_assigned_id)) =
            (accounts.keys().next(), accounts.keys().next_back())
        else {
            return Err(GenerationError::invalid("usercount", "Must be at least 1"));
        };
        let range = BatchResult {
            min_assigned_id,
            max_assigned_id,
        };

        info!(
            created = accounts.len(),
            min_id = range.min_assigned_id,
            max_id = range.max_assigned_id,
            "Batch generated"
        );
        Ok(BatchOutcome { range, accounts })
    }
}
