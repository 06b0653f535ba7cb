// Library crate for the test-user generator
// This file exposes the public API for integration tests

pub mod account;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod event;
pub mod generator;
pub mod report;
pub mod shared;
pub mod staging;
pub mod web;

// Re-export commonly used types for easier access in tests
pub use account::{AccountModel, AccountRepository, InMemoryAccountRepository};
pub use auth::{ActorContext, TokenConfig, CREATE_ACCOUNTS};
pub use catalog::{Gender, NameCatalog, PictureCatalog};
pub use config::AppConfig;
pub use event::{AccountEvent, EventBus, EventDispatcher};
pub use generator::{
    BatchGenerator, BatchOutcome, BatchResult, GenerationError, GenerationForm,
    GenerationService, SeededRandom, UserSynthesizer,
};
pub use report::{RangeReportView, ReportRow};
pub use shared::{AppError, AppState};
pub use staging::{FileStaging, InMemoryFileStaging, StagingRef};
