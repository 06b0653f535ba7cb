// Account generation: request validation, per-account synthesis and batches

// Public API - what other modules can use
pub use batch::{BatchGenerator, BatchOutcome, BatchResult};
pub use errors::{FieldErrors, GenerationError};
pub use random::{RandomSource, SeededRandom};
pub use request::{usernames_for, GenerationForm, GenerationRequest};
pub use service::GenerationService;
pub use synthesizer::{SynthesizedAccount, UserSynthesizer};

// Internal modules
mod batch;
mod errors;
pub mod random;
pub mod request;
mod service;
mod synthesizer;
