//! # REST API for Meal-Credit Top-Ups

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::get,
    Router,
};
use tracing::{info, warn};

use crate::backend::domain::commands::top_up::TopUpCommand;
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::top_up_service::TopUpAmount;
use crate::backend::io::rest::auth::ParentSession;
use crate::backend::io::rest::mappers::TransactionMapper;
use crate::backend::AppState;
use shared::{TopUpPresetsResponse, TopUpRequest, TopUpResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/presets", get(get_presets))
}

pub async fn get_presets() -> Json<TopUpPresetsResponse> {
    Json(TopUpPresetsResponse {
        presets: TopUpAmount::presets().iter().map(TopUpAmount::meals).collect(),
    })
}

/// Add meal credits to one of the signed-in parent's children.
///
/// A body whose amount is neither a number nor text is an invalid amount.
pub async fn top_up_student(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
    Path(student_id): Path<String>,
    request: Result<Json<TopUpRequest>, JsonRejection>,
) -> Result<Json<TopUpResponse>, DomainError> {
    info!("POST /api/students/{}/top-up", student_id);

    let Json(request) = request.map_err(|rejection| {
        warn!("Unreadable top-up body: {}", rejection);
        DomainError::InvalidAmount
    })?;

    let result = state
        .top_up_service
        .top_up(
            &session,
            TopUpCommand {
                student_id,
                amount: TransactionMapper::to_amount_entry(request.amount),
            },
        )
        .await?;

    Ok(Json(TransactionMapper::to_top_up_dto(result)))
}
