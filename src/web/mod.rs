// HTTP surface: the generator page, the JSON API and the router

// Public API - what other modules can use
pub use handlers::{generate_accounts, health, list_accounts, show_page, submit_form};
pub use types::{GenerateRequest, GenerateResponse, GeneratedAccount, RangeQuery};

// Internal modules
mod handlers;
mod page;
mod types;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth;
use crate::shared::AppState;
use crate::staging::DRAFT_URL_PREFIX;

/// All routes; everything except `/health` requires an authenticated actor
///
/// Staged profile pictures are served from the draft area under `/pictures`.
pub fn router(state: AppState) -> Router {
    let pictures = ServeDir::new(&state.config.draft_dir);

    let protected = Router::new()
        .route("/", get(show_page).post(submit_form))
        .route("/api/generate", post(generate_accounts))
        .route("/api/accounts", get(list_accounts))
        .nest_service(DRAFT_URL_PREFIX, pictures)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::actor_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}
