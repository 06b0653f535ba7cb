use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::broadcast;

use axum::Router;
use usergen::{
    account::{AccountRepository, InMemoryAccountRepository, NewAccount},
    auth::{TokenConfig, CREATE_ACCOUNTS},
    catalog::{NameCatalog, PictureCatalog},
    config::AppConfig,
    event::{AccountEvent, EventBus},
    generator::{BatchGenerator, GenerationService, SeededRandom, UserSynthesizer},
    shared::AppState,
    staging::DraftFileStaging,
    web,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

const NAMES_JSON: &str = r#"{
    "male": ["john", "peter", "mark", "luke"],
    "female": ["mary", "anna", "kate", "emma"],
    "lastnames": ["smith", "van der berg", "jones", "o'neil"]
}"#;

const PICTURES: [&str; 4] = ["female-1.jpg", "female-2.jpg", "male-1.jpg", "male-2.jpg"];

pub struct TestSetup {
    pub app: Router,
    pub repo: Arc<InMemoryAccountRepository>,
    pub events: broadcast::Receiver<AccountEvent>,
    pub admin_token: String,
    pub guest_token: String,
    pub pictures_dir: PathBuf,
    pub draft_dir: PathBuf,
    _data_dir: TempDir,
}

pub struct TestSetupBuilder {
    existing_accounts: Vec<(String, String)>,
    seed: u64,
    max_batch_size: u32,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            existing_accounts: vec![],
            seed: 42,
            max_batch_size: 1000,
        }
    }

    /// Account already in the store before the test starts
    pub fn with_existing_account(mut self, username: &str, email: &str) -> Self {
        self.existing_accounts
            .push((username.to_string(), email.to_string()));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: u32) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub async fn build(self) -> TestSetup {
        let data_dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: data_dir.path().join("data"),
            draft_dir: data_dir.path().join("drafts"),
            max_batch_size: self.max_batch_size,
            seed: Some(self.seed),
            ..AppConfig::default()
        };

        // Catalog files on disk, loaded the same way the server does
        std::fs::create_dir_all(config.pictures_dir()).unwrap();
        std::fs::write(config.names_path(), NAMES_JSON).unwrap();
        for picture in PICTURES {
            std::fs::write(config.pictures_dir().join(picture), picture.as_bytes()).unwrap();
        }
        let names = NameCatalog::load(&config.names_path()).unwrap();
        let pictures = PictureCatalog::load(&config.pictures_dir()).unwrap();

        let repo = Arc::new(InMemoryAccountRepository::new());
        for (username, email) in &self.existing_accounts {
            repo.create_account(&NewAccount::manual(
                username.clone(),
                "Existing".to_string(),
                "Account".to_string(),
                email.clone(),
            ))
            .await
            .unwrap();
        }

        let event_bus = EventBus::new(1000);
        let events = event_bus.subscribe();

        let synthesizer = UserSynthesizer::new(
            Arc::new(names),
            Arc::new(pictures),
            Arc::new(SeededRandom::from_seed(self.seed)),
            repo.clone(),
            Arc::new(DraftFileStaging::new(config.draft_dir.clone())),
            event_bus,
        )
        .with_email_domain(config.email_domain.clone())
        .with_max_email_attempts(config.max_email_attempts);

        let generation_service = Arc::new(GenerationService::new(
            BatchGenerator::new(synthesizer),
            repo.clone(),
            config.max_batch_size,
        ));

        let token_config = TokenConfig::with_secret("integration-secret", 1);
        let admin_token = token_config
            .create_token("admin", vec![CREATE_ACCOUNTS.to_string()])
            .unwrap();
        let guest_token = token_config.create_token("guest", vec![]).unwrap();

        let pictures_dir = config.pictures_dir();
        let draft_dir = config.draft_dir.clone();
        let state = AppState::new(
            repo.clone(),
            generation_service,
            token_config,
            Arc::new(config),
        );

        TestSetup {
            app: web::router(state),
            repo,
            events,
            admin_token,
            guest_token,
            pictures_dir,
            draft_dir,
            _data_dir: data_dir,
        }
    }
}
