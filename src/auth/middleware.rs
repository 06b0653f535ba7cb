use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::types::ActorContext;
use crate::shared::{AppError, AppState};

/// Cookie carrying the token for browser use of the HTML page
pub const TOKEN_COOKIE: &str = "usergen_token";

/// Actor authentication middleware - validates the Bearer token (or the
/// `usergen_token` cookie) and adds an ActorContext to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), auth::actor_auth))
/// Handlers can then extract Extension(actor): Extension<ActorContext>.
#[instrument(skip(state, req, next))]
pub async fn actor_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers()).ok_or_else(|| {
        warn!(uri = %req.uri(), "Request without credentials");
        AppError::Unauthorized("Missing authorization token".to_string())
    })?;

    let claims = match state.token_config.validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Actor authentication failed: {}", e);
            return Err(e);
        }
    };

    debug!(actor_id = %claims.actor_id, "Authentication successful, adding actor to request");
    req.extensions_mut().insert(ActorContext::from(claims));

    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        return auth_header
            .strip_prefix("Bearer ")
            .map(|token| token.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
}
