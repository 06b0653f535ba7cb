use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::errors::GenerationError;
use super::random::{choose, RandomSource};
use crate::account::{AccountFilter, AccountRepository, NewAccount};
use crate::catalog::{title_case, Gender, NameCatalog, PictureCatalog};
use crate::event::{AccountEvent, EventBus};
use crate::staging::{FileStaging, StagingRef};

pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";
pub const DEFAULT_MAX_EMAIL_ATTEMPTS: u32 = 10_000;

/// An account created by the synthesizer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedAccount {
    pub assigned_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub picture: StagingRef,
}

/// Creates one randomized account per username
///
/// Names and pictures come from the catalogs, the email is searched for
/// uniqueness against the store, and the account is persisted through the
/// store before `account_created` is published.
pub struct UserSynthesizer {
    names: Arc<NameCatalog>,
    pictures: Arc<PictureCatalog>,
    random: Arc<dyn RandomSource>,
    account_repository: Arc<dyn AccountRepository + Send + Sync>,
    file_staging: Arc<dyn FileStaging>,
    event_bus: EventBus,
    email_domain: String,
    max_email_attempts: u32,
}

impl UserSynthesizer {
    pub fn new(
        names: Arc<NameCatalog>,
        pictures: Arc<PictureCatalog>,
        random: Arc<dyn RandomSource>,
        account_repository: Arc<dyn AccountRepository + Send + Sync>,
        file_staging: Arc<dyn FileStaging>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            names,
            pictures,
            random,
            account_repository,
            file_staging,
            event_bus,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            max_email_attempts: DEFAULT_MAX_EMAIL_ATTEMPTS,
        }
    }

    pub fn with_email_domain(mut self, email_domain: impl Into<String>) -> Self {
        self.email_domain = email_domain.into();
        self
    }

    pub fn with_max_email_attempts(mut self, max_email_attempts: u32) -> Self {
        self.max_email_attempts = max_email_attempts;
        self
    }

    #[instrument(skip(self, password))]
    pub async fn synthesize(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SynthesizedAccount, GenerationError> {
        let gender = if self.random.coin_flip() {
            Gender::Male
        } else {
            Gender::Female
        };
        let first_name = self.pick_name(self.names.first_names(gender))?;
        let last_name = self.pick_name(self.names.last_names())?;
        let email = self.unused_email(username).await?;

        let picture_path = choose(self.random.as_ref(), self.pictures.pictures(gender))
            .ok_or_else(|| {
                GenerationError::DataUnavailable(format!("no {} pictures available", gender))
            })?;

        let new_account = NewAccount::manual(
            username.to_string(),
            first_name.clone(),
            last_name.clone(),
            email.clone(),
        );
        let assigned_id = self
            .account_repository
            .create_account(&new_account)
            .await
            .map_err(|e| {
                warn!(username = %username, error = %e, "Store rejected account");
                GenerationError::creation_failed(username, e)
            })?;

        // Nothing is staged for a username the store rejected
        let staging_ref = self
            .file_staging
            .stage_file(picture_path)
            .await
            .map_err(|e| GenerationError::creation_failed(username, e))?;

        self.account_repository
            .set_password(assigned_id, password)
            .await
            .map_err(|e| GenerationError::creation_failed(username, e))?;
        self.account_repository
            .apply_profile_picture(assigned_id, &staging_ref)
            .await
            .map_err(|e| GenerationError::creation_failed(username, e))?;

        self.event_bus.publish(AccountEvent::AccountCreated {
            account_id: assigned_id,
            username: username.to_string(),
        });

        info!(
            account_id = assigned_id,
            username = %username,
            email = %email,
            gender = %gender,
            "Account synthesized"
        );

        Ok(SynthesizedAccount {
            assigned_id,
            username: username.to_string(),
            first_name,
            last_name,
            email,
            gender,
            picture: staging_ref,
        })
    }

    fn pick_name(&self, pool: &[String]) -> Result<String, GenerationError> {
        choose(self.random.as_ref(), pool)
            .map(|name| title_case(name))
            .ok_or_else(|| GenerationError::DataUnavailable("name pool is empty".to_string()))
    }

    /// `{username}@{domain}`, then `{username}-1@{domain}`, `-2`, ... until free
    async fn unused_email(&self, username: &str) -> Result<String, GenerationError> {
        for suffix in 0..=self.max_email_attempts {
            let email = if suffix == 0 {
                format!("{}@{}", username, self.email_domain)
            } else {
                format!("{}-{}@{}", username, suffix, self.email_domain)
            };

            let taken = self
                .account_repository
                .account_exists(&AccountFilter::Email(email.clone()))
                .await
                .map_err(|e| GenerationError::creation_failed(username, e))?;
            if !taken {
                return Ok(email);
            }
            debug!(email = %email, "Email already in use, probing next suffix");
        }

        Err(GenerationError::creation_failed(
            username,
            format!("no free email after {} attempts", self.max_email_attempts),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::InMemoryAccountRepository;
    use crate::account::password::verify_password;
    use crate::generator::random::SeededRandom;
    use crate::shared::test_utils::{test_names, test_pictures};
    use crate::staging::InMemoryFileStaging;

    /// Always returns the same answers; makes selections predictable
    struct FixedRandom {
        index: usize,
        male: bool,
    }

    impl RandomSource for FixedRandom {
        fn pick_index(&self, len: usize) -> usize {
            self.index.min(len - 1)
        }

        fn coin_flip(&self) -> bool {
            self.male
        }
    }

    struct Fixture {
        repo: Arc<InMemoryAccountRepository>,
        staging: Arc<InMemoryFileStaging>,
        event_bus: EventBus,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                repo: Arc::new(InMemoryAccountRepository::new()),
                staging: Arc::new(InMemoryFileStaging::new()),
                event_bus: EventBus::new(100),
            }
        }

        fn synthesizer(&self, random: Arc<dyn RandomSource>) -> UserSynthesizer {
            UserSynthesizer::new(
                Arc::new(test_names()),
                Arc::new(test_pictures()),
                random,
                self.repo.clone(),
                self.staging.clone(),
                self.event_bus.clone(),
            )
        }
    }

    #[tokio::test]
    async fn test_synthesize_persists_account() {
        let fixture = Fixture::new();
        let mut events = fixture.event_bus.subscribe();
        let synthesizer = fixture.synthesizer(Arc::new(FixedRandom {
            index: 1,
            male: false,
        }));

        let account = synthesizer.synthesize("user1", "test").await.unwrap();

        assert_eq!(account.username, "user1");
        assert_eq!(account.email, "user1@example.com");
        assert_eq!(account.gender, Gender::Female);
        assert_eq!(account.first_name, "Anna");
        assert_eq!(account.last_name, "Van Der Berg");

        let stored = fixture
            .repo
            .get_account(account.assigned_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.username, "user1");
        assert_eq!(stored.email, "user1@example.com");
        assert!(stored.confirmed);
        assert_eq!(stored.auth, "manual");
        assert!(verify_password("test", stored.password_hash.as_deref().unwrap()));
        assert_eq!(stored.picture, Some(account.picture.draft_key()));

        let event = events.try_recv().unwrap();
        assert_eq!(
            event,
            AccountEvent::AccountCreated {
                account_id: account.assigned_id,
                username: "user1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_picture_matches_gender() {
        let fixture = Fixture::new();

        let male = fixture
            .synthesizer(Arc::new(FixedRandom {
                index: 0,
                male: true,
            }))
            .synthesize("user1", "test")
            .await
            .unwrap();
        let female = fixture
            .synthesizer(Arc::new(FixedRandom {
                index: 0,
                male: false,
            }))
            .synthesize("user2", "test")
            .await
            .unwrap();

        assert_eq!(male.first_name, "John");
        assert!(male.picture.source.ends_with("male-1.jpg"));
        assert!(female.picture.source.ends_with("female-1.jpg"));
        assert_eq!(fixture.staging.staged().len(), 2);
    }

    #[tokio::test]
    async fn test_email_search_skips_taken_addresses() {
        let fixture = Fixture::new();
        for (username, email) in [
            ("someone", "user1@example.com"),
            ("someone-else", "user1-1@example.com"),
        ] {
            fixture
                .repo
                .create_account(&NewAccount::manual(
                    username.to_string(),
                    "A".to_string(),
                    "B".to_string(),
                    email.to_string(),
                ))
                .await
                .unwrap();
        }

        let account = fixture
            .synthesizer(Arc::new(SeededRandom::from_seed(3)))
            .synthesize("user1", "test")
            .await
            .unwrap();

        assert_eq!(account.email, "user1-2@example.com");
    }

    #[tokio::test]
    async fn test_email_search_is_bounded() {
        let fixture = Fixture::new();
        fixture
            .repo
            .create_account(&NewAccount::manual(
                "someone".to_string(),
                "A".to_string(),
                "B".to_string(),
                "user1@example.com".to_string(),
            ))
            .await
            .unwrap();

        let result = fixture
            .synthesizer(Arc::new(SeededRandom::from_seed(3)))
            .with_max_email_attempts(0)
            .synthesize("user1", "test")
            .await;

        assert!(matches!(
            result,
            Err(GenerationError::AccountCreationFailed { ref username, .. }) if username == "user1"
        ));
        assert_eq!(fixture.repo.account_count(), 1);
    }

    #[tokio::test]
    async fn test_custom_email_domain() {
        let fixture = Fixture::new();
        let account = fixture
            .synthesizer(Arc::new(SeededRandom::from_seed(3)))
            .with_email_domain("school.test")
            .synthesize("user1", "test")
            .await
            .unwrap();

        assert_eq!(account.email, "user1@school.test");
    }

    #[tokio::test]
    async fn test_duplicate_username_fails() {
        let fixture = Fixture::new();
        let synthesizer = fixture.synthesizer(Arc::new(SeededRandom::from_seed(3)));

        synthesizer.synthesize("user1", "test").await.unwrap();
        let result = synthesizer.synthesize("user1", "test").await;

        assert!(matches!(
            result,
            Err(GenerationError::AccountCreationFailed { .. })
        ));
        assert_eq!(fixture.repo.account_count(), 1);
        // The rejected account never got a picture staged
        assert_eq!(fixture.staging.staged().len(), 1);
    }

    #[tokio::test]
    async fn test_same_seed_same_account_details() {
        let first = Fixture::new();
        let second = Fixture::new();

        let a = first
            .synthesizer(Arc::new(SeededRandom::from_seed(99)))
            .synthesize("user1", "test")
            .await
            .unwrap();
        let b = second
            .synthesizer(Arc::new(SeededRandom::from_seed(99)))
            .synthesize("user1", "test")
            .await
            .unwrap();

        assert_eq!(a.gender, b.gender);
        assert_eq!(a.first_name, b.first_name);
        assert_eq!(a.last_name, b.last_name);
        assert_eq!(a.picture.source, b.picture.source);
    }
}
