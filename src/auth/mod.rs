// Public API - what other modules can use
pub use middleware::actor_auth;
pub use token::TokenConfig;
pub use types::{ActorClaims, ActorContext};

// Internal modules
mod middleware;
pub mod token;
mod types;

/// Capability required to generate accounts and to view generated ranges
pub const CREATE_ACCOUNTS: &str = "user:create";

/// Authorization gate for account generation
pub fn can_create_accounts(actor: &ActorContext) -> bool {
    actor.has_capability(CREATE_ACCOUNTS)
}
