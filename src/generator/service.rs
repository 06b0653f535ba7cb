use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::batch::{BatchGenerator, BatchOutcome};
use super::errors::GenerationError;
use super::request::GenerationForm;
use crate::account::AccountRepository;
use crate::auth::{can_create_accounts, ActorContext};

/// Entry point for account generation
///
/// Checks access, validates the form, rejects requests whose usernames are
/// already taken, then runs the batch.
pub struct GenerationService {
    batch_generator: BatchGenerator,
    account_repository: Arc<dyn AccountRepository + Send + Sync>,
    max_batch_size: u32,
}

impl GenerationService {
    pub fn new(
        batch_generator: BatchGenerator,
        account_repository: Arc<dyn AccountRepository + Send + Sync>,
        max_batch_size: u32,
    ) -> Self {
        Self {
            batch_generator,
            account_repository,
            max_batch_size,
        }
    }

    pub fn max_batch_size(&self) -> u32 {
        self.max_batch_size
    }

    #[instrument(skip(self, actor, form), fields(actor_id = %actor.actor_id))]
    pub async fn generate(
        &self,
        actor: &ActorContext,
        form: &GenerationForm,
    ) -> Result<BatchOutcome, GenerationError> {
        if !can_create_accounts(actor) {
            warn!(actor_id = %actor.actor_id, "Actor may not create accounts");
            return Err(GenerationError::Forbidden);
        }

        let request = form.validate(self.max_batch_size)?;
        let usernames = request.usernames();

        let taken = self
            .account_repository
            .find_existing_usernames(&usernames)
            .await
            .map_err(|e| GenerationError::Storage(e.to_string()))?;
        if !taken.is_empty() {
            warn!(taken = %taken.join(", "), "Requested usernames already exist");
            return Err(GenerationError::UsernameCollision(taken));
        }

        info!(
            prefix = %request.username_prefix,
            start = request.start_index,
            count = request.count,
            "Starting account generation"
        );
        self.batch_generator.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::InMemoryAccountRepository;
    use crate::auth::CREATE_ACCOUNTS;
    use crate::event::EventBus;
    use crate::generator::random::SeededRandom;
    use crate::generator::synthesizer::UserSynthesizer;
    use crate::shared::test_utils::{test_names, test_pictures};
    use crate::staging::InMemoryFileStaging;

    fn service(repo: Arc<InMemoryAccountRepository>) -> GenerationService {
        let synthesizer = UserSynthesizer::new(
            Arc::new(test_names()),
            Arc::new(test_pictures()),
            Arc::new(SeededRandom::from_seed(1)),
            repo.clone(),
            Arc::new(InMemoryFileStaging::new()),
            EventBus::new(100),
        );
        GenerationService::new(BatchGenerator::new(synthesizer), repo, 100)
    }

    fn admin() -> ActorContext {
        ActorContext::new("admin", vec![CREATE_ACCOUNTS.to_string()])
    }

    fn form(count: &str, prefix: &str, index: &str) -> GenerationForm {
        GenerationForm {
            usercount: count.to_string(),
            usernameprefix: prefix.to_string(),
            usernameindex: index.to_string(),
            password: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_success() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let outcome = service(repo.clone())
            .generate(&admin(), &form("3", "user", "1"))
            .await
            .unwrap();

        assert_eq!(outcome.accounts.len(), 3);
        assert_eq!(repo.account_count(), 3);
    }

    #[tokio::test]
    async fn test_actor_without_capability_is_forbidden() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let viewer = ActorContext::new("viewer", Vec::new());

        let result = service(repo.clone())
            .generate(&viewer, &form("3", "user", "1"))
            .await;

        assert!(matches!(result, Err(GenerationError::Forbidden)));
        assert_eq!(repo.account_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_form_creates_nothing() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let result = service(repo.clone())
            .generate(&admin(), &form("abc", "user", "1"))
            .await;

        assert!(matches!(result, Err(GenerationError::InvalidRequest(_))));
        assert_eq!(repo.account_count(), 0);
    }

    #[tokio::test]
    async fn test_rerun_same_request_collides() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let service = service(repo.clone());

        service
            .generate(&admin(), &form("2", "user", "1"))
            .await
            .unwrap();
        let result = service.generate(&admin(), &form("2", "user", "1")).await;

        match result {
            Err(GenerationError::UsernameCollision(taken)) => {
                assert_eq!(taken, vec!["user1", "user2"]);
            }
            other => panic!("expected UsernameCollision, got {:?}", other),
        }
        assert_eq!(repo.account_count(), 2);
    }

    #[tokio::test]
    async fn test_partial_overlap_collides_before_generation() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let service = service(repo.clone());

        service
            .generate(&admin(), &form("2", "user", "3"))
            .await
            .unwrap();
        let result = service.generate(&admin(), &form("5", "user", "1")).await;

        match result {
            Err(GenerationError::UsernameCollision(taken)) => {
                assert_eq!(taken, vec!["user3", "user4"]);
            }
            other => panic!("expected UsernameCollision, got {:?}", other),
        }
        // Nothing from the rejected request was created
        assert_eq!(repo.account_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_size_limit() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let result = service(repo)
            .generate(&admin(), &form("101", "user", "1"))
            .await;

        assert!(matches!(result, Err(GenerationError::InvalidRequest(_))));
    }
}
