use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::account::{AccountModel, AccountRepository};
use crate::auth::{can_create_accounts, ActorContext};
use crate::shared::AppError;
use crate::staging::draft_url;

/// One line of the generated-users report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
    /// URL of the profile picture
    pub picture: Option<String>,
}

impl From<AccountModel> for ReportRow {
    fn from(account: AccountModel) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name(),
            username: account.username,
            email: account.email,
            picture: account.picture.as_deref().map(draft_url),
        }
    }
}

/// Read-only listing of the accounts whose id falls in a range
pub struct RangeReportView {
    account_repository: Arc<dyn AccountRepository + Send + Sync>,
}

impl RangeReportView {
    pub fn new(account_repository: Arc<dyn AccountRepository + Send + Sync>) -> Self {
        Self { account_repository }
    }

    /// Rows with `min_id <= id <= max_id`, ordered by username
    #[instrument(skip(self, actor), fields(actor_id = %actor.actor_id))]
    pub async fn list(
        &self,
        actor: &ActorContext,
        min_id: i64,
        max_id: i64,
    ) -> Result<Vec<ReportRow>, AppError> {
        if !can_create_accounts(actor) {
            warn!(actor_id = %actor.actor_id, "Actor may not view generated accounts");
            return Err(AppError::Forbidden(
                "Not allowed to view generated accounts".to_string(),
            ));
        }
        if min_id > max_id {
            return Ok(Vec::new());
        }

        let rows: Vec<ReportRow> = self
            .account_repository
            .query_by_id_range(min_id, max_id)
            .await?
            .into_iter()
            .map(ReportRow::from)
            .collect();

        debug!(rows = rows.len(), "Report rows loaded");
        Ok(rows)
    }
}
