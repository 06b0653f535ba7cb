use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use super::page::PageView;
use super::types::{GenerateRequest, GenerateResponse, RangeQuery};
use crate::auth::ActorContext;
use crate::generator::{GenerationError, GenerationForm};
use crate::report::ReportRow;
use crate::shared::{AppError, AppState};

/// GET /
///
/// Renders the form, plus the report when `fromid` and `toid` are both set
#[instrument(name = "show_page", skip(state, actor))]
pub async fn show_page(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(range): Query<RangeQuery>,
) -> Result<Html<String>, AppError> {
    let report = if range.is_set() {
        Some(
            state
                .report_view
                .list(&actor, range.fromid, range.toid)
                .await?,
        )
    } else {
        None
    };

    Ok(Html(render(
        &state,
        &GenerationForm::default(),
        &BTreeMap::new(),
        report.as_deref(),
    )))
}

/// POST /
///
/// Redirects to the report of the new batch, or re-renders the form with
/// field errors
#[instrument(name = "submit_form", skip(state, actor, form))]
pub async fn submit_form(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Form(form): Form<GenerationForm>,
) -> Result<Response, AppError> {
    let errors: BTreeMap<String, String> =
        match state.generation_service.generate(&actor, &form).await {
            Ok(outcome) => {
                info!(
                    fromid = outcome.range.min_assigned_id,
                    toid = outcome.range.max_assigned_id,
                    "Accounts generated from form"
                );
                let location = format!(
                    "/?fromid={}&toid={}",
                    outcome.range.min_assigned_id, outcome.range.max_assigned_id
                );
                return Ok(Redirect::to(&location).into_response());
            }
            Err(GenerationError::InvalidRequest(errors)) => errors
                .into_iter()
                .map(|(field, message)| (field.to_string(), message))
                .collect(),
            Err(error @ GenerationError::UsernameCollision(_)) => {
                BTreeMap::from([("usernameprefix".to_string(), error.to_string())])
            }
            Err(error) => return Err(error.into()),
        };

    let html = render(&state, &form, &errors, None);
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
}

/// POST /api/generate
#[instrument(name = "generate_accounts", skip(state, actor, request))]
pub async fn generate_accounts(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let form = GenerationForm::from(request);
    let outcome = state.generation_service.generate(&actor, &form).await?;

    info!(
        created = outcome.accounts.len(),
        fromid = outcome.range.min_assigned_id,
        toid = outcome.range.max_assigned_id,
        "Accounts generated"
    );

    Ok(Json(GenerateResponse::from(outcome)))
}

/// GET /api/accounts?fromid=&toid=
///
/// Either bound may be left out to leave that side of the range open
#[instrument(name = "list_accounts", skip(state, actor))]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ReportRow>>, AppError> {
    let (min_id, max_id) = range.bounds();
    let rows = state.report_view.list(&actor, min_id, max_id).await?;
    Ok(Json(rows))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

fn render(
    state: &AppState,
    form: &GenerationForm,
    errors: &BTreeMap<String, String>,
    report: Option<&[ReportRow]>,
) -> String {
    PageView {
        form,
        errors,
        report,
        max_batch_size: state.generation_service.max_batch_size(),
    }
    .render()
}
